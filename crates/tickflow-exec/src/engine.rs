//! Execution engine core: order-state lifecycle and fill/cancel emission.

use tickflow_core::events::{CancelEvent, FillEvent, MarketEvent, OrderEvent};
use tickflow_core::queue::EventQueue;
use tickflow_core::types::{OrderId, Timestamp};

use crate::state::OrderState;
use crate::store::OrderStore;

/// Shared execution-engine state and the fill/cancel emission algorithm.
///
/// Concrete executors own a core and call [`ExecutionCore::emit_fill`] /
/// [`ExecutionCore::emit_cancel`] for every execution they decide on; the
/// core keeps per-order aggregates and routes terminal orders into the
/// store's historical ledger.
#[derive(Debug, Default)]
pub struct ExecutionCore {
    store: OrderStore,
}

impl ExecutionCore {
    /// Create a core with the default ledger capacity
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: OrderStore::new(),
        }
    }

    /// Create a core whose ledger keeps `capacity` retired orders
    #[must_use]
    pub fn with_ledger_capacity(capacity: usize) -> Self {
        Self {
            store: OrderStore::with_ledger_capacity(capacity),
        }
    }

    /// Current state of an order, live or absent
    #[must_use]
    pub fn get_order(&self, id: OrderId) -> Option<&OrderState> {
        self.store.get(id)
    }

    /// Read-only access to the order store
    #[must_use]
    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    /// Mutable access to the order store
    pub fn store_mut(&mut self) -> &mut OrderStore {
        &mut self.store
    }

    /// Record a fill against an order and push the fill event.
    ///
    /// Seeds a fresh state if the order has not been seen, accumulates the
    /// fill into the weighted average, and retires the order once
    /// `filled_qty` reaches the order quantity. A zero `filled_qty` is a
    /// no-op for the average; an over-fill is accepted, logged, and still
    /// closes the order.
    pub fn emit_fill(
        &mut self,
        order: &OrderEvent,
        filled_qty: i64,
        exec_price: f64,
        queue: &mut EventQueue,
        timestamp: Timestamp,
    ) {
        if self.store.get(order.id).is_none() {
            self.store.emplace(OrderState::new(order.clone()));
        }

        let mut complete = false;
        let mut filled_total = 0;
        if let Some(state) = self.store.get_mut(order.id) {
            let prev_filled = state.filled_qty;
            state.filled_qty += filled_qty;

            if state.filled_qty > 0 {
                state.avg_fill_price = (state.avg_fill_price * prev_filled as f64
                    + exec_price * filled_qty as f64)
                    / state.filled_qty as f64;
            } else {
                state.avg_fill_price = 0.0;
            }

            complete = state.is_complete();
            filled_total = state.filled_qty;
        }

        if complete {
            if filled_total > order.quantity {
                tracing::warn!(
                    order_id = order.id.value(),
                    filled = filled_total,
                    quantity = order.quantity,
                    "over-fill accepted, closing order"
                );
            }
            self.store.inactive(order.id);
        }

        queue.push(FillEvent {
            order: order.clone(),
            filled_qty,
            order_qty: order.quantity,
            side: order.side,
            price: exec_price,
            timestamp,
        });
    }

    /// Cancel an order and push the cancel event.
    ///
    /// The order is retired into the ledger whether or not it was resting;
    /// Cancelled is a terminal state just like Filled.
    pub fn emit_cancel(
        &mut self,
        order: &OrderEvent,
        reason: impl Into<String>,
        queue: &mut EventQueue,
        timestamp: Timestamp,
    ) {
        if self.store.get(order.id).is_none() {
            self.store.emplace(OrderState::new(order.clone()));
        }
        self.store.inactive(order.id);

        queue.push(CancelEvent {
            order: order.clone(),
            reason: reason.into(),
            timestamp,
        });
    }
}

/// A concrete execution engine: matches orders against its venue model.
///
/// Dispatch is compile-time: the engine loop is generic over the executor
/// type, so `on_order`/`on_market` are monomorphized with no virtual calls
/// on the hot path.
pub trait Executor {
    /// Translate an order event into fills and cancels
    fn on_order(&mut self, order: &OrderEvent, queue: &mut EventQueue);

    /// Re-evaluate resting orders against new market data
    fn on_market(&mut self, market: &MarketEvent, queue: &mut EventQueue);

    /// The shared execution core
    fn core(&self) -> &ExecutionCore;

    /// Mutable access to the shared execution core
    fn core_mut(&mut self) -> &mut ExecutionCore;

    /// Current state of an order by id
    fn get_order(&self, id: OrderId) -> Option<&OrderState> {
        self.core().get_order(id)
    }
}
