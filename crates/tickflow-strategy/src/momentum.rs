//! Momentum strategy: chases price moves beyond a threshold.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use tickflow_core::events::{CancelEvent, MarketEvent, OrderEvent, SignalEvent};
use tickflow_core::queue::EventQueue;
use tickflow_core::traits::Strategy;
use tickflow_core::types::{OrderFlags, OrderId, Side};

/// Momentum strategy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumConfig {
    /// Fractional price move that triggers an order (e.g. 0.002 = 20 bps)
    pub threshold: f64,
    /// Quantity per emitted order
    pub order_size: i64,
    /// Maximum absolute intended position per symbol
    pub max_position: i64,
    /// First order id this strategy allocates; keeps its id range disjoint
    /// from the portfolio's allocator
    pub order_id_base: u64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            threshold: 0.002,
            order_size: 1,
            max_position: 10,
            order_id_base: 1 << 40,
        }
    }
}

/// Buys into upward moves and sells into downward moves, re-arming its
/// reference price after each trigger. A signal event flattens all intended
/// positions with reduce-only market orders.
#[derive(Debug)]
pub struct MomentumStrategy {
    config: MomentumConfig,
    reference: HashMap<String, f64>,
    intents: HashMap<String, i64>,
    next_id: u64,
    orders_emitted: u64,
    cancels_seen: u64,
}

impl MomentumStrategy {
    /// Create a strategy with the given configuration
    #[must_use]
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            next_id: config.order_id_base,
            config,
            reference: HashMap::new(),
            intents: HashMap::new(),
            orders_emitted: 0,
            cancels_seen: 0,
        }
    }

    /// Intended net position for a symbol (orders emitted, fills assumed)
    #[must_use]
    pub fn intent(&self, symbol: &str) -> i64 {
        self.intents.get(symbol).copied().unwrap_or(0)
    }

    /// Orders emitted so far
    #[must_use]
    pub const fn orders_emitted(&self) -> u64 {
        self.orders_emitted
    }

    /// Cancels observed so far
    #[must_use]
    pub const fn cancels_seen(&self) -> u64 {
        self.cancels_seen
    }

    fn allocate_id(&mut self) -> OrderId {
        let id = self.next_id;
        self.next_id += 1;
        OrderId::new(id)
    }

    fn emit(
        &mut self,
        market: &MarketEvent,
        side: Side,
        quantity: i64,
        flags: OrderFlags,
        queue: &mut EventQueue,
    ) {
        let order = OrderEvent::market(
            market.symbol.clone(),
            self.allocate_id(),
            quantity,
            side,
            market.timestamp(),
        )
        .with_flags(flags)
        .with_origin(market.clone());

        *self.intents.entry(market.symbol.clone()).or_insert(0) += side.signed(quantity);
        self.orders_emitted += 1;
        queue.push(order);
    }
}

impl Strategy for MomentumStrategy {
    fn on_market(&mut self, market: &MarketEvent, queue: &mut EventQueue) {
        let reference = *self
            .reference
            .entry(market.symbol.clone())
            .or_insert(market.price);
        if reference <= 0.0 {
            return;
        }

        let change = (market.price - reference) / reference;
        if change.abs() < self.config.threshold {
            return;
        }

        let side = if change > 0.0 { Side::Buy } else { Side::Sell };
        let intent = self.intent(&market.symbol);
        let projected = intent + side.signed(self.config.order_size);
        // Re-arm on every trigger, traded or not.
        self.reference.insert(market.symbol.clone(), market.price);

        if projected.abs() > self.config.max_position {
            return;
        }

        self.emit(market, side, self.config.order_size, OrderFlags::NONE, queue);
    }

    fn on_signal(&mut self, _signal: &SignalEvent, queue: &mut EventQueue) {
        // Flatten every intended position.
        let open: Vec<(String, i64)> = self
            .intents
            .iter()
            .filter(|(_, qty)| **qty != 0)
            .map(|(s, qty)| (s.clone(), *qty))
            .collect();

        for (symbol, qty) in open {
            let Some(price) = self.reference.get(&symbol).copied() else {
                continue;
            };
            let side = if qty > 0 { Side::Sell } else { Side::Buy };
            let market = MarketEvent::new(symbol, price, 1.0, 0, false);
            self.emit(
                &market,
                side,
                qty.abs(),
                OrderFlags::REDUCE_ONLY,
                queue,
            );
        }
    }

    fn on_cancel(&mut self, cancel: &CancelEvent) {
        self.cancels_seen += 1;
        // Roll back the optimistic intent for our own cancelled orders.
        if cancel.order.id.value() >= self.config.order_id_base {
            if let Some(intent) = self.intents.get_mut(&cancel.order.symbol) {
                *intent -= cancel.order.signed_quantity();
            }
        }
    }
}
