//! External-contract traits: the interfaces the engine core consumes.

use serde::{Deserialize, Serialize};

use crate::events::{CancelEvent, MarketEvent, SignalEvent};
use crate::queue::EventQueue;
use crate::types::SymbolId;

/// A single trade observation from a market source.
///
/// Carries the same five fields as [`MarketEvent`]; the dispatcher wraps
/// polled ticks into market events before routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Trade symbol
    pub symbol: String,
    /// Trade price
    pub price: f64,
    /// Quantity traded
    pub quantity: f64,
    /// Epoch timestamp in milliseconds
    pub timestamp_ms: i64,
    /// True if the buyer initiated the trade
    pub buyer_initiated: bool,
}

impl From<Tick> for MarketEvent {
    fn from(tick: Tick) -> Self {
        MarketEvent {
            symbol: tick.symbol,
            price: tick.price,
            quantity: tick.quantity,
            timestamp_ms: tick.timestamp_ms,
            buyer_initiated: tick.buyer_initiated,
        }
    }
}

/// A source of market ticks: a recorded file, a socket, or a generator.
///
/// Returning `None` signals end-of-stream or no data currently available;
/// the engine's control hook decides which it is.
pub trait MarketSource {
    /// Poll for the next tick
    fn next(&mut self) -> Option<Tick>;
}

impl<T: MarketSource + ?Sized> MarketSource for Box<T> {
    fn next(&mut self) -> Option<Tick> {
        (**self).next()
    }
}

/// A user trading strategy.
///
/// Handlers run to completion on the dispatcher thread and must not block.
/// They may push any number of Signal or Order events onto the supplied
/// queue.
pub trait Strategy {
    /// React to a market event
    fn on_market(&mut self, market: &MarketEvent, queue: &mut EventQueue);

    /// React to a signal event
    fn on_signal(&mut self, signal: &SignalEvent, queue: &mut EventQueue);

    /// Observe a cancellation of one of the strategy's orders
    fn on_cancel(&mut self, cancel: &CancelEvent);
}

/// Outbound bus for risk-approved orders. The portfolio manager is the sole
/// emitter.
pub trait OrderBus {
    /// Emit an approved order toward the execution venue
    fn emit_order(
        &mut self,
        order_id: u64,
        symbol: SymbolId,
        signed_qty: i64,
        price: f64,
        timestamp_ns: i64,
    );
}

/// Bus that discards everything. Useful when risk gating is exercised
/// without a downstream venue.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBus;

impl OrderBus for NullBus {
    fn emit_order(
        &mut self,
        _order_id: u64,
        _symbol: SymbolId,
        _signed_qty: i64,
        _price: f64,
        _timestamp_ns: i64,
    ) {
    }
}

/// An emitted order captured by [`RecordingBus`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmittedOrder {
    /// Allocated order id
    pub order_id: u64,
    /// Symbol the order targets
    pub symbol: SymbolId,
    /// Signed quantity (positive buy, negative sell)
    pub signed_qty: i64,
    /// Order price
    pub price: f64,
    /// Emission timestamp in nanoseconds
    pub timestamp_ns: i64,
}

/// Bus that records every emission, for tests and audits.
#[derive(Debug, Default)]
pub struct RecordingBus {
    /// Captured emissions in order
    pub orders: Vec<EmittedOrder>,
}

impl OrderBus for RecordingBus {
    fn emit_order(
        &mut self,
        order_id: u64,
        symbol: SymbolId,
        signed_qty: i64,
        price: f64,
        timestamp_ns: i64,
    ) {
        self.orders.push(EmittedOrder {
            order_id,
            symbol,
            signed_qty,
            price,
            timestamp_ns,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_into_market_event() {
        let tick = Tick {
            symbol: "BTCUSD".to_string(),
            price: 100.0,
            quantity: 0.5,
            timestamp_ms: 42,
            buyer_initiated: false,
        };

        let market: MarketEvent = tick.into();
        assert_eq!(market.symbol, "BTCUSD");
        assert_eq!(market.price, 100.0);
        assert!(!market.buyer_initiated);
    }

    #[test]
    fn test_recording_bus() {
        let mut bus = RecordingBus::default();
        bus.emit_order(1, SymbolId::new(0), 10, 50.0, 1_000);
        bus.emit_order(2, SymbolId::new(0), -5, 51.0, 2_000);

        assert_eq!(bus.orders.len(), 2);
        assert_eq!(bus.orders[0].order_id, 1);
        assert_eq!(bus.orders[1].signed_qty, -5);
    }
}
