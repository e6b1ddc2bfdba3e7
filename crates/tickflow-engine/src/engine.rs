//! The engine loop: poll the source, dispatch, drain the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tickflow_core::error::Result;
use tickflow_core::events::Event;
use tickflow_core::queue::EventQueue;
use tickflow_core::traits::{MarketSource, Strategy};
use tickflow_core::types::SymbolTable;
use tickflow_exec::Executor;
use tickflow_portfolio::PortfolioManager;

use crate::control::EngineControl;

/// Cloneable cross-thread pause toggle.
///
/// The flag is advisory and eventual: the loop observes it with relaxed
/// atomics at its two suspension points. It is the only object shared
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct PauseHandle(Arc<AtomicBool>);

impl PauseHandle {
    /// Request the engine to pause at its next iteration
    pub fn pause(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Allow the engine to resume
    pub fn resume(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    /// Current advisory state
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Single-threaded event dispatcher.
///
/// Owns the event queue, the symbol table, and the portfolio; the source,
/// strategy, executor, and control are the pluggable collaborators. All
/// dispatch is monomorphized over the type parameters.
pub struct Engine<const N: usize, Src, Strat, Exec, Ctl>
where
    Src: MarketSource,
    Strat: Strategy,
    Exec: Executor,
    Ctl: EngineControl,
{
    source: Src,
    strategy: Strat,
    executor: Exec,
    portfolio: PortfolioManager<N>,
    control: Ctl,
    symbols: SymbolTable,
    queue: EventQueue,
    pause: PauseHandle,
    ticks: u64,
}

impl<const N: usize, Src, Strat, Exec, Ctl> Engine<N, Src, Strat, Exec, Ctl>
where
    Src: MarketSource,
    Strat: Strategy,
    Exec: Executor,
    Ctl: EngineControl,
{
    /// Assemble an engine from its collaborators
    pub fn new(
        source: Src,
        strategy: Strat,
        executor: Exec,
        portfolio: PortfolioManager<N>,
        control: Ctl,
    ) -> Self {
        Self {
            source,
            strategy,
            executor,
            portfolio,
            control,
            symbols: SymbolTable::new(N),
            queue: EventQueue::new(),
            pause: PauseHandle::default(),
            ticks: 0,
        }
    }

    /// Run the engine loop until a stop condition.
    ///
    /// One iteration: stop check; pause yield (stop re-checked under
    /// pause); poll the source and dispatch the tick as a Market event, or
    /// consult `handle_no_event`; drain the internal queue to empty; report
    /// loop latency and tick count to the control hook.
    ///
    /// # Errors
    ///
    /// Returns the first handler error the control's `on_error` refuses to
    /// swallow.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!("engine loop starting");
        loop {
            if self.control.should_stop() {
                break;
            }

            while self.pause.is_paused() {
                if self.control.should_stop() {
                    return Ok(());
                }
                std::thread::yield_now();
            }

            let start = Instant::now();

            match self.source.next() {
                Some(tick) => {
                    self.ticks += 1;
                    let event = Event::Market(tick.into());
                    if let Err(err) = self.dispatch(event) {
                        self.control.on_error(err)?;
                    }
                }
                None => {
                    if !self.control.handle_no_event() {
                        self.drain()?;
                        break;
                    }
                }
            }

            self.drain()?;

            self.control
                .record_loop(start.elapsed().as_nanos() as u64, self.ticks);
        }
        tracing::debug!(ticks = self.ticks, "engine loop finished");
        Ok(())
    }

    /// Seed an event into the internal queue before or between runs.
    pub fn push_event(&mut self, event: impl Into<Event>) {
        self.queue.push(event);
    }

    /// Handle to pause/resume the loop from another thread
    #[must_use]
    pub fn pause_handle(&self) -> PauseHandle {
        self.pause.clone()
    }

    /// Source ticks dispatched so far
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The portfolio manager
    #[must_use]
    pub const fn portfolio(&self) -> &PortfolioManager<N> {
        &self.portfolio
    }

    /// Mutable portfolio access (risk configuration, signal gating)
    pub fn portfolio_mut(&mut self) -> &mut PortfolioManager<N> {
        &mut self.portfolio
    }

    /// The execution engine
    #[must_use]
    pub const fn executor(&self) -> &Exec {
        &self.executor
    }

    /// The strategy
    #[must_use]
    pub const fn strategy(&self) -> &Strat {
        &self.strategy
    }

    /// The symbol table built up from observed ticks
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    fn drain(&mut self) -> Result<()> {
        while !self.queue.is_empty() {
            let event = self.queue.pop()?;
            if let Err(err) = self.dispatch(event) {
                self.control.on_error(err)?;
            }
        }
        Ok(())
    }

    /// Route one event to its handlers.
    ///
    /// Market events mark the portfolio first, then re-evaluate resting
    /// orders, then inform the strategy, so strategies observe a portfolio
    /// already aware of the new price and resting fills precede the
    /// strategy's reaction in the queue.
    fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Market(market) => {
                let id = self.symbols.intern(&market.symbol)?;
                self.portfolio.on_market_data(id, market.price)?;
                self.executor.on_market(&market, &mut self.queue);
                self.strategy.on_market(&market, &mut self.queue);
            }
            Event::Signal(signal) => {
                self.strategy.on_signal(&signal, &mut self.queue);
            }
            Event::Order(order) => {
                self.executor.on_order(&order, &mut self.queue);
            }
            Event::Fill(fill) => {
                let id = self.symbols.intern(fill.symbol())?;
                self.portfolio
                    .on_fill(id, fill.signed_quantity(), fill.price)?;
            }
            Event::Cancel(cancel) => {
                self.portfolio.on_cancel(&cancel);
                self.strategy.on_cancel(&cancel);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::BacktestControl;
    use tickflow_core::error::Error;
    use tickflow_core::events::{CancelEvent, MarketEvent, OrderEvent, SignalEvent};
    use tickflow_core::traits::Tick;
    use tickflow_core::types::{OrderId, Side};
    use tickflow_exec::ReplayExecutor;

    struct VecSource {
        ticks: std::vec::IntoIter<Tick>,
    }

    impl VecSource {
        fn new(ticks: Vec<Tick>) -> Self {
            Self {
                ticks: ticks.into_iter(),
            }
        }
    }

    impl MarketSource for VecSource {
        fn next(&mut self) -> Option<Tick> {
            self.ticks.next()
        }
    }

    fn tick(symbol: &str, price: f64, ts_ms: i64) -> Tick {
        Tick {
            symbol: symbol.to_string(),
            price,
            quantity: 100.0,
            timestamp_ms: ts_ms,
            buyer_initiated: true,
        }
    }

    /// Buys one lot the first time it sees a price at or below the trigger.
    struct DipBuyer {
        trigger: f64,
        bought: bool,
        cancels_seen: usize,
    }

    impl DipBuyer {
        fn new(trigger: f64) -> Self {
            Self {
                trigger,
                bought: false,
                cancels_seen: 0,
            }
        }
    }

    impl Strategy for DipBuyer {
        fn on_market(&mut self, market: &MarketEvent, queue: &mut EventQueue) {
            if !self.bought && market.price <= self.trigger {
                self.bought = true;
                let order = OrderEvent::market(
                    market.symbol.clone(),
                    OrderId::new(1_000),
                    5,
                    Side::Buy,
                    market.timestamp(),
                )
                .with_origin(market.clone());
                queue.push(order);
            }
        }

        fn on_signal(&mut self, _signal: &SignalEvent, _queue: &mut EventQueue) {}

        fn on_cancel(&mut self, _cancel: &CancelEvent) {
            self.cancels_seen += 1;
        }
    }

    struct NoopStrategy;

    impl Strategy for NoopStrategy {
        fn on_market(&mut self, _market: &MarketEvent, _queue: &mut EventQueue) {}
        fn on_signal(&mut self, _signal: &SignalEvent, _queue: &mut EventQueue) {}
        fn on_cancel(&mut self, _cancel: &CancelEvent) {}
    }

    #[test]
    fn test_end_to_end_market_to_fill() {
        let source = VecSource::new(vec![
            tick("BTCUSD", 105.0, 1_000),
            tick("BTCUSD", 99.0, 2_000),
            tick("BTCUSD", 101.0, 3_000),
        ]);
        let mut engine: Engine<16, _, _, _, _> = Engine::new(
            source,
            DipBuyer::new(100.0),
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::new(),
        );

        engine.run().unwrap();

        assert_eq!(engine.ticks(), 3);
        // The dip at 99 produced a market buy, filled at 99.
        let id = engine.symbols().get("BTCUSD").unwrap();
        let pos = engine.portfolio().position(id).unwrap();
        assert_eq!(pos.quantity, 5);
        assert_eq!(pos.avg_price, 99.0);
        assert_eq!(engine.portfolio().fill_count(), 1);
        // Last tick marked the position.
        assert_eq!(pos.last_price, 101.0);
    }

    #[test]
    fn test_source_drain_ends_run() {
        let source = VecSource::new(vec![tick("BTCUSD", 100.0, 1_000)]);
        let mut engine: Engine<16, _, _, _, _> = Engine::new(
            source,
            NoopStrategy,
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::new(),
        );

        engine.run().unwrap();
        assert_eq!(engine.ticks(), 1);
    }

    #[test]
    fn test_tick_budget_stops_early() {
        let source = VecSource::new(vec![
            tick("BTCUSD", 100.0, 1_000),
            tick("BTCUSD", 101.0, 2_000),
            tick("BTCUSD", 102.0, 3_000),
        ]);
        let mut engine: Engine<16, _, _, _, _> = Engine::new(
            source,
            NoopStrategy,
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::with_max_ticks(2),
        );

        engine.run().unwrap();
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn test_seeded_order_dispatches_to_executor() {
        let source = VecSource::new(vec![tick("BTCUSD", 100.0, 1_000)]);
        let mut engine: Engine<16, _, _, _, _> = Engine::new(
            source,
            NoopStrategy,
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::new(),
        );

        // A resting buy below the first tick's price.
        engine.push_event(OrderEvent::limit(
            "BTCUSD",
            OrderId::new(1),
            5,
            Side::Buy,
            99.0,
            tickflow_core::types::Timestamp::from_millis(500),
        ));

        engine.run().unwrap();

        // Order rested; no fill yet.
        assert_eq!(engine.portfolio().fill_count(), 0);
        assert!(engine.executor().get_order(OrderId::new(1)).is_some());
    }

    #[test]
    fn test_cancel_reaches_portfolio_and_strategy() {
        let source = VecSource::new(vec![tick("BTCUSD", 100.0, 1_000)]);
        let mut engine: Engine<16, _, _, _, _> = Engine::new(
            source,
            DipBuyer::new(0.0), // never buys
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::new(),
        );

        // Post-only market orders are always cancelled by the executor.
        engine.push_event(
            OrderEvent::market(
                "BTCUSD",
                OrderId::new(7),
                5,
                Side::Buy,
                tickflow_core::types::Timestamp::from_millis(500),
            )
            .with_flags(tickflow_core::types::OrderFlags::POST_ONLY),
        );

        engine.run().unwrap();

        assert_eq!(engine.portfolio().cancel_count(), 1);
        assert_eq!(engine.portfolio().cancelled_orders(), &[OrderId::new(7)]);
    }

    #[test]
    fn test_invalid_symbol_capacity_aborts_by_default() {
        // Capacity 1: the second distinct symbol cannot be interned.
        let source = VecSource::new(vec![tick("BTCUSD", 100.0, 1_000), tick("ETHUSD", 10.0, 2_000)]);
        let mut engine: Engine<1, _, _, _, _> = Engine::new(
            source,
            NoopStrategy,
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::new(),
        );

        let result = engine.run();
        assert!(matches!(result, Err(Error::SymbolTableFull(_))));
    }

    struct SwallowErrors {
        swallowed: usize,
    }

    impl EngineControl for SwallowErrors {
        fn on_error(&mut self, _err: Error) -> Result<()> {
            self.swallowed += 1;
            Ok(())
        }
    }

    #[test]
    fn test_on_error_override_continues() {
        let source = VecSource::new(vec![tick("BTCUSD", 100.0, 1_000), tick("ETHUSD", 10.0, 2_000)]);
        let mut engine: Engine<1, _, _, _, _> = Engine::new(
            source,
            NoopStrategy,
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            SwallowErrors { swallowed: 0 },
        );

        engine.run().unwrap();
        assert_eq!(engine.ticks(), 2);
    }

    #[test]
    fn test_pause_handle_round_trip() {
        let source = VecSource::new(vec![]);
        let engine: Engine<16, _, _, _, _> = Engine::new(
            source,
            NoopStrategy,
            ReplayExecutor::new(),
            PortfolioManager::new(100_000.0),
            BacktestControl::new(),
        );

        let handle = engine.pause_handle();
        assert!(!handle.is_paused());
        handle.pause();
        assert!(handle.is_paused());
        handle.resume();
        assert!(!handle.is_paused());
    }
}
