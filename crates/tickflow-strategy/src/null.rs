//! A strategy that does nothing.

use tickflow_core::events::{CancelEvent, MarketEvent, SignalEvent};
use tickflow_core::queue::EventQueue;
use tickflow_core::traits::Strategy;

/// Ignores every event. Useful for exercising the engine plumbing alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStrategy;

impl Strategy for NullStrategy {
    fn on_market(&mut self, _market: &MarketEvent, _queue: &mut EventQueue) {}

    fn on_signal(&mut self, _signal: &SignalEvent, _queue: &mut EventQueue) {}

    fn on_cancel(&mut self, _cancel: &CancelEvent) {}
}
