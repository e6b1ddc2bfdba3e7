//! Portfolio manager: positions, cash, P&L, risk gate, and metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tickflow_core::events::CancelEvent;
use tickflow_core::traits::OrderBus;
use tickflow_core::types::{OrderId, SymbolId, Timestamp};

use crate::position::PositionState;
use crate::risk::RiskLimits;

/// Validation failures raised by the portfolio manager.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum PortfolioError {
    /// Symbol id outside `[0, N)`
    #[error("Symbol id {id} out of range (capacity {capacity})")]
    OutOfRange {
        /// Offending symbol id
        id: u32,
        /// Configured capacity
        capacity: usize,
    },

    /// Price not finite or not positive
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    /// Zero signed quantity
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
}

impl From<PortfolioError> for tickflow_core::Error {
    fn from(err: PortfolioError) -> Self {
        match err {
            PortfolioError::OutOfRange { id, capacity } => {
                tickflow_core::Error::SymbolOutOfRange { id, capacity }
            }
            PortfolioError::InvalidPrice(p) => tickflow_core::Error::InvalidPrice(p),
            PortfolioError::InvalidQuantity(q) => tickflow_core::Error::InvalidQuantity(q),
        }
    }
}

/// Result of a risk-gated signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    /// Accepted: the order was emitted on the bus with this id
    Submitted(OrderId),
    /// Denied by the risk gate; nothing was emitted
    Rejected,
}

/// Snapshot of portfolio-wide metrics over active positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Number of positions with non-zero quantity
    pub active_positions: u32,
    /// Sum of `qty * (last - avg)` over active positions
    pub unrealized_pnl: f64,
    /// Sum of `|qty * last|` over active positions
    pub gross_exposure: f64,
    /// Sum of `qty * last` over active positions
    pub net_exposure: f64,
    /// Portfolio-level realized P&L total
    pub realized_pnl: f64,
    /// Fills applied so far
    pub fill_count: u64,
}

/// Portfolio state over a fixed universe of `N` symbols.
///
/// Positions and risk limits are dense arrays indexed by [`SymbolId`]; an
/// active bitmap lets metric passes visit only non-zero positions. The
/// order-id counter is atomic so concurrent read-only callers may observe
/// it, though the engine loop is the only writer.
#[derive(Debug)]
pub struct PortfolioManager<const N: usize> {
    cash: f64,
    starting_cash: f64,
    realized_pnl_total: f64,
    positions: Box<[PositionState]>,
    risk: Box<[RiskLimits]>,
    active: Vec<u64>,
    next_order_id: AtomicU64,
    order_count: u64,
    fill_count: u64,
    reject_count: u64,
    cancel_count: u64,
    cancelled_orders: Vec<OrderId>,
}

impl<const N: usize> Default for PortfolioManager<N> {
    fn default() -> Self {
        Self::new(tickflow_core::constants::DEFAULT_STARTING_CASH)
    }
}

impl<const N: usize> PortfolioManager<N> {
    /// Create a manager with the given starting cash
    #[must_use]
    pub fn new(starting_cash: f64) -> Self {
        Self {
            cash: starting_cash,
            starting_cash,
            realized_pnl_total: 0.0,
            positions: vec![PositionState::default(); N].into_boxed_slice(),
            risk: vec![RiskLimits::default(); N].into_boxed_slice(),
            active: vec![0u64; N.div_ceil(64)],
            next_order_id: AtomicU64::new(1),
            order_count: 0,
            fill_count: 0,
            reject_count: 0,
            cancel_count: 0,
            cancelled_orders: Vec::new(),
        }
    }

    /// Symbol capacity of this manager
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Pre-trade risk gate and order emission.
    ///
    /// Validates inputs, consults [`PortfolioManager::can_execute`], and on
    /// acceptance books the pending quantity, allocates a monotonically
    /// increasing order id, and emits the order on `bus`. A risk denial is
    /// not an error: the reject counter is bumped and nothing is emitted.
    ///
    /// # Errors
    ///
    /// [`PortfolioError::OutOfRange`] / [`PortfolioError::InvalidPrice`] /
    /// [`PortfolioError::InvalidQuantity`] on malformed input.
    pub fn on_signal<B: OrderBus>(
        &mut self,
        symbol: SymbolId,
        signed_qty: i64,
        price: f64,
        timestamp: Timestamp,
        bus: &mut B,
    ) -> Result<SignalOutcome, PortfolioError> {
        let idx = self.validate(symbol, signed_qty, price)?;

        if !self.can_execute(symbol, signed_qty, price) {
            self.reject_count += 1;
            tracing::debug!(
                symbol = symbol.value(),
                signed_qty,
                price,
                "signal rejected by risk gate"
            );
            return Ok(SignalOutcome::Rejected);
        }

        self.positions[idx].pending_qty += signed_qty;
        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed);
        bus.emit_order(id, symbol, signed_qty, price, timestamp.as_nanos());
        self.order_count += 1;
        Ok(SignalOutcome::Submitted(OrderId::new(id)))
    }

    /// Check the four risk conditions for a prospective order. Returns
    /// false for out-of-range symbols rather than failing.
    #[must_use]
    pub fn can_execute(&self, symbol: SymbolId, signed_qty: i64, price: f64) -> bool {
        let idx = symbol.index();
        if idx >= N {
            return false;
        }
        let pos = &self.positions[idx];
        let limits = &self.risk[idx];

        if signed_qty.abs() > limits.max_order_size {
            return false;
        }

        let projected = pos.quantity + pos.pending_qty + signed_qty;
        if projected.abs() > limits.max_position {
            return false;
        }
        if projected.abs() as f64 * price > limits.max_notional {
            return false;
        }

        // Buys must be coverable by cash; sells carry no cash requirement.
        if signed_qty > 0 && signed_qty as f64 * price > self.cash {
            return false;
        }

        true
    }

    /// Adjust the pending-quantity intention ledger directly.
    ///
    /// # Errors
    ///
    /// [`PortfolioError::OutOfRange`] if the symbol is outside the universe.
    pub fn add_pending(&mut self, symbol: SymbolId, signed_qty: i64) -> Result<(), PortfolioError> {
        let idx = self.check_range(symbol)?;
        self.positions[idx].pending_qty += signed_qty;
        Ok(())
    }

    /// Apply an executed fill: reconcile pending, update the position,
    /// move cash, and refresh the active bitmap.
    ///
    /// # Errors
    ///
    /// Same validation failures as [`PortfolioManager::on_signal`].
    pub fn on_fill(
        &mut self,
        symbol: SymbolId,
        signed_qty: i64,
        price: f64,
    ) -> Result<(), PortfolioError> {
        let idx = self.validate(symbol, signed_qty, price)?;

        let pos = &mut self.positions[idx];
        pos.pending_qty -= signed_qty;
        let realized = pos.apply_fill(signed_qty, price);
        self.realized_pnl_total += realized;
        self.cash -= signed_qty as f64 * price;
        self.fill_count += 1;

        let is_active = self.positions[idx].is_active();
        self.set_active(idx, is_active);
        Ok(())
    }

    /// Record the latest market price for a symbol.
    ///
    /// # Errors
    ///
    /// [`PortfolioError::OutOfRange`] / [`PortfolioError::InvalidPrice`].
    pub fn on_market_data(&mut self, symbol: SymbolId, price: f64) -> Result<(), PortfolioError> {
        let idx = self.check_range(symbol)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(PortfolioError::InvalidPrice(price));
        }
        self.positions[idx].last_price = price;
        Ok(())
    }

    /// Record a cancellation report.
    pub fn on_cancel(&mut self, cancel: &CancelEvent) {
        self.cancel_count += 1;
        self.cancelled_orders.push(cancel.order.id);
    }

    /// Aggregate metrics over active positions. O(active) via the bitmap.
    #[must_use]
    pub fn compute_metrics(&self) -> PortfolioMetrics {
        let mut metrics = PortfolioMetrics {
            realized_pnl: self.realized_pnl_total,
            fill_count: self.fill_count,
            ..PortfolioMetrics::default()
        };

        self.for_each_active(|pos| {
            metrics.active_positions += 1;
            metrics.unrealized_pnl += pos.unrealized_pnl();
            let value = pos.market_value();
            metrics.gross_exposure += value.abs();
            metrics.net_exposure += value;
        });

        metrics
    }

    /// Cash plus the market value of all active positions
    #[must_use]
    pub fn get_total_value(&self) -> f64 {
        let mut total = self.cash;
        self.for_each_active(|pos| total += pos.market_value());
        total
    }

    /// Sum of unrealized P&L over active positions
    #[must_use]
    pub fn unrealized_pnl(&self) -> f64 {
        let mut total = 0.0;
        self.for_each_active(|pos| total += pos.unrealized_pnl());
        total
    }

    /// Replace the risk limits for one symbol.
    ///
    /// # Errors
    ///
    /// [`PortfolioError::OutOfRange`] if the symbol is outside the universe.
    pub fn set_risk_limit(
        &mut self,
        symbol: SymbolId,
        limits: RiskLimits,
    ) -> Result<(), PortfolioError> {
        let idx = self.check_range(symbol)?;
        self.risk[idx] = limits;
        Ok(())
    }

    /// Position state for a symbol, if in range
    #[must_use]
    pub fn position(&self, symbol: SymbolId) -> Option<&PositionState> {
        self.positions.get(symbol.index())
    }

    /// Signed in-flight quantity for a symbol, if in range
    #[must_use]
    pub fn pending(&self, symbol: SymbolId) -> Option<i64> {
        self.positions.get(symbol.index()).map(|p| p.pending_qty)
    }

    /// Current cash balance
    #[must_use]
    pub const fn cash(&self) -> f64 {
        self.cash
    }

    /// Starting cash balance
    #[must_use]
    pub const fn starting_cash(&self) -> f64 {
        self.starting_cash
    }

    /// Portfolio-level realized P&L total
    #[must_use]
    pub const fn realized_pnl(&self) -> f64 {
        self.realized_pnl_total
    }

    /// Orders emitted so far
    #[must_use]
    pub const fn order_count(&self) -> u64 {
        self.order_count
    }

    /// Fills applied so far
    #[must_use]
    pub const fn fill_count(&self) -> u64 {
        self.fill_count
    }

    /// Signals denied by the risk gate
    #[must_use]
    pub const fn reject_count(&self) -> u64 {
        self.reject_count
    }

    /// Cancellations recorded
    #[must_use]
    pub const fn cancel_count(&self) -> u64 {
        self.cancel_count
    }

    /// Ids of cancelled orders, in arrival order
    #[must_use]
    pub fn cancelled_orders(&self) -> &[OrderId] {
        &self.cancelled_orders
    }

    fn check_range(&self, symbol: SymbolId) -> Result<usize, PortfolioError> {
        let idx = symbol.index();
        if idx >= N {
            return Err(PortfolioError::OutOfRange {
                id: symbol.value(),
                capacity: N,
            });
        }
        Ok(idx)
    }

    fn validate(
        &self,
        symbol: SymbolId,
        signed_qty: i64,
        price: f64,
    ) -> Result<usize, PortfolioError> {
        let idx = self.check_range(symbol)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(PortfolioError::InvalidPrice(price));
        }
        if signed_qty == 0 {
            return Err(PortfolioError::InvalidQuantity(signed_qty));
        }
        Ok(idx)
    }

    fn set_active(&mut self, idx: usize, active: bool) {
        let word = idx / 64;
        let bit = 1u64 << (idx % 64);
        if active {
            self.active[word] |= bit;
        } else {
            self.active[word] &= !bit;
        }
    }

    fn for_each_active(&self, mut f: impl FnMut(&PositionState)) {
        for (w, word) in self.active.iter().enumerate() {
            let mut bits = *word;
            while bits != 0 {
                let b = bits.trailing_zeros() as usize;
                let idx = w * 64 + b;
                f(&self.positions[idx]);
                bits &= bits - 1;
            }
        }
    }
}
