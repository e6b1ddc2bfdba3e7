//! Tick-replay executor: matches orders against the recorded trade stream.
//!
//! The venue model is deliberately shallow (depth-of-book accuracy is out of
//! scope): takers fill in full at the last trade price, while resting orders
//! fill at their own limit price as subsequent ticks trade through them,
//! rationed by each tick's traded quantity.

use std::collections::HashMap;

use tickflow_core::events::{MarketEvent, OrderEvent};
use tickflow_core::queue::EventQueue;
use tickflow_core::types::{OrderId, OrderType, Side, Timestamp};

use crate::engine::{ExecutionCore, Executor};

#[derive(Debug, Clone, Copy)]
struct Mark {
    price: f64,
    timestamp: Timestamp,
}

/// Execution engine that replays orders against market ticks.
#[derive(Debug, Default)]
pub struct ReplayExecutor {
    core: ExecutionCore,
    marks: HashMap<String, Mark>,
    net_position: HashMap<String, i64>,
    stops: Vec<OrderId>,
}

impl ReplayExecutor {
    /// Create a new replay executor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom historical ledger capacity
    #[must_use]
    pub fn with_ledger_capacity(capacity: usize) -> Self {
        Self {
            core: ExecutionCore::with_ledger_capacity(capacity),
            marks: HashMap::new(),
            net_position: HashMap::new(),
            stops: Vec::new(),
        }
    }

    /// Net position per symbol accumulated from this executor's own fills
    #[must_use]
    pub fn net_position(&self, symbol: &str) -> i64 {
        self.net_position.get(symbol).copied().unwrap_or(0)
    }

    /// Cancel a working order by id. No-op if the id is unknown.
    pub fn cancel(
        &mut self,
        id: OrderId,
        reason: &str,
        queue: &mut EventQueue,
        timestamp: Timestamp,
    ) {
        let Some(state) = self.core.get_order(id) else {
            return;
        };
        let order = state.order.clone();
        self.stops.retain(|s| *s != id);
        self.core.emit_cancel(&order, reason, queue, timestamp);
    }

    fn fill(
        &mut self,
        order: &OrderEvent,
        qty: i64,
        price: f64,
        queue: &mut EventQueue,
        timestamp: Timestamp,
    ) {
        *self.net_position.entry(order.symbol.clone()).or_insert(0) += order.side.signed(qty);
        self.core.emit_fill(order, qty, price, queue, timestamp);
    }

    /// Fill `target` in full at the tick price, cancelling any reduce-only
    /// remainder so clamped orders never rest.
    fn take(
        &mut self,
        order: &OrderEvent,
        target: i64,
        price: f64,
        queue: &mut EventQueue,
        timestamp: Timestamp,
    ) {
        self.fill(order, target, price, queue, timestamp);
        if target < order.quantity {
            self.core
                .emit_cancel(order, "reduce-only remainder", queue, timestamp);
        }
    }

    fn rest(&mut self, order: &OrderEvent) {
        let state = crate::state::OrderState::new(order.clone());
        if order.order_type.is_stop() {
            self.stops.push(order.id);
        }
        self.core.store_mut().emplace(state);
    }

    fn stop_triggered(side: Side, stop_price: f64, last_price: f64) -> bool {
        match side {
            Side::Buy => last_price >= stop_price,
            Side::Sell => last_price <= stop_price,
        }
    }

    fn limit_marketable(side: Side, limit_price: f64, last_price: f64) -> bool {
        match side {
            Side::Buy => last_price <= limit_price,
            Side::Sell => last_price >= limit_price,
        }
    }

    /// Quantity this order may execute given its reduce-only constraint,
    /// or `None` when the flag forbids any execution.
    fn reduce_only_target(&self, order: &OrderEvent) -> Option<i64> {
        if !order.flags.is_reduce_only() {
            return Some(order.quantity);
        }
        let pos = self.net_position(&order.symbol);
        if pos * order.side.sign() >= 0 {
            return None;
        }
        Some(order.quantity.min(pos.abs()))
    }

    fn handle_market_order(
        &mut self,
        order: &OrderEvent,
        target: i64,
        queue: &mut EventQueue,
    ) {
        if order.flags.is_post_only() {
            self.core
                .emit_cancel(order, "post-only market order", queue, order.timestamp);
            return;
        }
        let Some(mark) = self.marks.get(&order.symbol).copied() else {
            self.core
                .emit_cancel(order, "no market data", queue, order.timestamp);
            return;
        };
        self.take(order, target, mark.price, queue, mark.timestamp);
    }

    fn handle_limit_order(&mut self, order: &OrderEvent, target: i64, queue: &mut EventQueue) {
        let mark = self.marks.get(&order.symbol).copied();
        let marketable = mark
            .map(|m| Self::limit_marketable(order.side, order.price, m.price))
            .unwrap_or(false);

        if marketable {
            if order.flags.is_post_only() {
                self.core.emit_cancel(
                    order,
                    "post-only would take liquidity",
                    queue,
                    order.timestamp,
                );
                return;
            }
            // mark is present when marketable
            if let Some(m) = mark {
                self.take(order, target, m.price, queue, m.timestamp);
            }
            return;
        }

        if order.flags.is_ioc() {
            self.core.emit_cancel(
                order,
                "immediate-or-cancel not marketable",
                queue,
                order.timestamp,
            );
        } else if order.flags.is_fok() {
            self.core.emit_cancel(
                order,
                "fill-or-kill not marketable",
                queue,
                order.timestamp,
            );
        } else if order.flags.is_reduce_only() {
            self.core
                .emit_cancel(order, "reduce-only would rest", queue, order.timestamp);
        } else {
            self.rest(order);
        }
    }

    fn handle_stop_order(&mut self, order: &OrderEvent, target: i64, queue: &mut EventQueue) {
        let triggered = self
            .marks
            .get(&order.symbol)
            .map(|m| Self::stop_triggered(order.side, order.price, m.price))
            .unwrap_or(false);

        if triggered {
            match order.order_type {
                OrderType::StopMarket => self.handle_market_order(order, target, queue),
                _ => self.handle_limit_order(order, target, queue),
            }
            return;
        }

        if order.flags.is_ioc() || order.flags.is_fok() {
            self.core
                .emit_cancel(order, "stop not triggered", queue, order.timestamp);
        } else if order.flags.is_reduce_only() {
            self.core
                .emit_cancel(order, "reduce-only would rest", queue, order.timestamp);
        } else {
            self.rest(order);
        }
    }

    /// Fire stop orders whose trigger the new price reaches.
    fn check_triggers(&mut self, market: &MarketEvent, queue: &mut EventQueue) {
        let mut fired = Vec::new();
        self.stops.retain(|id| {
            let Some(state) = self.core.get_order(*id) else {
                // Already retired, drop the trigger entry.
                return false;
            };
            if state.order.symbol != market.symbol {
                return true;
            }
            if Self::stop_triggered(state.order.side, state.order.price, market.price) {
                fired.push((state.order.clone(), state.remaining()));
                return false;
            }
            true
        });

        for (order, remaining) in fired {
            if let Some(state) = self.core.store_mut().get_mut(order.id) {
                state.triggered = true;
            }
            match order.order_type {
                OrderType::StopMarket => {
                    // Taker fill against the live state; completion retires it.
                    self.fill(&order, remaining, market.price, queue, market.timestamp());
                }
                _ => {
                    // Stop-limit becomes a live limit at the same price; if
                    // it is already marketable it takes immediately.
                    if Self::limit_marketable(order.side, order.price, market.price) {
                        self.fill(&order, remaining, market.price, queue, market.timestamp());
                    }
                }
            }
        }
    }

    /// Match resting orders against the tick, rationed by traded quantity.
    fn match_resting(&mut self, market: &MarketEvent, queue: &mut EventQueue) {
        let mut budget = (market.quantity.floor() as i64).max(1);
        let mut matched: Vec<(OrderEvent, i64, f64)> = Vec::new();

        self.core.store().for_each_pruned(|state| {
            if budget == 0 {
                return false;
            }
            if state.order.symbol != market.symbol {
                return true;
            }
            if !state.triggered {
                return true;
            }
            if !Self::limit_marketable(state.order.side, state.order.price, market.price) {
                // Worse-priced same-symbol orders follow; prune this side.
                return false;
            }
            let qty = state.remaining().min(budget);
            if qty > 0 {
                budget -= qty;
                matched.push((state.order.clone(), qty, state.order.price));
            }
            true
        });

        for (order, qty, price) in matched {
            self.fill(&order, qty, price, queue, market.timestamp());
        }
    }
}

impl Executor for ReplayExecutor {
    fn on_order(&mut self, order: &OrderEvent, queue: &mut EventQueue) {
        let Some(target) = self.reduce_only_target(order) else {
            self.core.emit_cancel(
                order,
                "reduce-only: no position to reduce",
                queue,
                order.timestamp,
            );
            return;
        };

        match order.order_type {
            OrderType::Market => self.handle_market_order(order, target, queue),
            OrderType::Limit => self.handle_limit_order(order, target, queue),
            OrderType::StopMarket | OrderType::StopLimit => {
                self.handle_stop_order(order, target, queue);
            }
        }
    }

    fn on_market(&mut self, market: &MarketEvent, queue: &mut EventQueue) {
        self.marks.insert(
            market.symbol.clone(),
            Mark {
                price: market.price,
                timestamp: market.timestamp(),
            },
        );

        self.check_triggers(market, queue);
        self.match_resting(market, queue);
    }

    fn core(&self) -> &ExecutionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ExecutionCore {
        &mut self.core
    }
}
