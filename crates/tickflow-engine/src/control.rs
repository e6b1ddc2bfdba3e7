//! Engine control hooks: stop, idle, error, and telemetry decisions.

use tickflow_core::error::{Error, Result};

/// Hooks the engine loop consults each iteration.
///
/// The defaults describe a plain backtest: never stop early, terminate when
/// the source is drained, and abort the run on the first handler error.
/// Live-leaning engines override `handle_no_event` to idle and `on_error`
/// to log and continue.
pub trait EngineControl {
    /// Checked at the top of every iteration and under pause
    fn should_stop(&self) -> bool {
        false
    }

    /// Called when the source has no tick; true continues the loop, false
    /// ends the run
    fn handle_no_event(&mut self) -> bool {
        false
    }

    /// Policy for errors escaping a handler. The default rethrows, which
    /// aborts the run.
    ///
    /// # Errors
    ///
    /// Propagates `err` unless the implementation swallows it.
    fn on_error(&mut self, err: Error) -> Result<()> {
        Err(err)
    }

    /// Loop telemetry: dispatch latency of the iteration and ticks so far
    fn record_loop(&mut self, _latency_ns: u64, _ticks: u64) {}
}

/// Control for finite backtest runs, with an optional tick budget.
#[derive(Debug, Default)]
pub struct BacktestControl {
    max_ticks: Option<u64>,
    seen: u64,
}

impl BacktestControl {
    /// Run until the source is drained
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop after at most `max_ticks` source ticks
    #[must_use]
    pub fn with_max_ticks(max_ticks: u64) -> Self {
        Self {
            max_ticks: Some(max_ticks),
            seen: 0,
        }
    }
}

impl EngineControl for BacktestControl {
    fn should_stop(&self) -> bool {
        matches!(self.max_ticks, Some(max) if self.seen >= max)
    }

    fn record_loop(&mut self, _latency_ns: u64, ticks: u64) {
        self.seen = ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_control_ends_on_drain() {
        let mut control = BacktestControl::new();
        assert!(!control.should_stop());
        assert!(!control.handle_no_event());
    }

    #[test]
    fn test_tick_budget() {
        let mut control = BacktestControl::with_max_ticks(2);
        assert!(!control.should_stop());

        control.record_loop(0, 2);
        assert!(control.should_stop());
    }

    #[test]
    fn test_default_on_error_rethrows() {
        let mut control = BacktestControl::new();
        let result = control.on_error(Error::QueueEmpty);
        assert!(matches!(result, Err(Error::QueueEmpty)));
    }
}
