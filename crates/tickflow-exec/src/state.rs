//! Per-order aggregate state tracked by the execution engine.

use serde::{Deserialize, Serialize};
use tickflow_core::events::OrderEvent;

/// Fill-progress state for a single order.
///
/// Wraps the immutable originating order together with cumulative fill
/// progress. While the order is live, `filled_qty <= order.quantity`;
/// reaching (or, on an over-fill, passing) equality retires the state to
/// the historical ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderState {
    /// The originating order
    pub order: OrderEvent,
    /// Cumulative filled quantity
    pub filled_qty: i64,
    /// Volume-weighted average fill price
    pub avg_fill_price: f64,
    /// Whether a stop order's trigger has fired
    pub triggered: bool,
}

impl OrderState {
    /// Create a fresh state for a newly seen order
    #[must_use]
    pub fn new(order: OrderEvent) -> Self {
        let triggered = !order.order_type.is_stop();
        Self {
            order,
            filled_qty: 0,
            avg_fill_price: 0.0,
            triggered,
        }
    }

    /// Quantity still unfilled (clamped at zero on over-fills)
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> i64 {
        (self.order.quantity - self.filled_qty).max(0)
    }

    /// Whether the order has reached its total quantity
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.filled_qty >= self.order.quantity
    }

    /// Whether any quantity has been filled
    #[inline]
    #[must_use]
    pub const fn is_partially_filled(&self) -> bool {
        self.filled_qty > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickflow_core::types::{OrderId, Side, Timestamp};

    fn limit_order(qty: i64) -> OrderEvent {
        OrderEvent::limit(
            "BTCUSD",
            OrderId::new(1),
            qty,
            Side::Buy,
            100.0,
            Timestamp::from_millis(0),
        )
    }

    #[test]
    fn test_fresh_state() {
        let state = OrderState::new(limit_order(10));
        assert_eq!(state.filled_qty, 0);
        assert_eq!(state.avg_fill_price, 0.0);
        assert_eq!(state.remaining(), 10);
        assert!(!state.is_complete());
        assert!(state.triggered);
    }

    #[test]
    fn test_stop_state_starts_untriggered() {
        let order = OrderEvent::stop_market(
            "BTCUSD",
            OrderId::new(2),
            5,
            Side::Sell,
            95.0,
            Timestamp::from_millis(0),
        );
        let state = OrderState::new(order);
        assert!(!state.triggered);
    }

    #[test]
    fn test_remaining_clamps_on_overfill() {
        let mut state = OrderState::new(limit_order(10));
        state.filled_qty = 15;
        assert_eq!(state.remaining(), 0);
        assert!(state.is_complete());
    }
}
