//! Per-symbol position state and the fill-application algebra.

use serde::{Deserialize, Serialize};

/// State of a trading position for a single symbol.
///
/// `quantity` is the signed net position (positive long, negative short);
/// `pending_qty` is the signed sum of in-flight order quantities not yet
/// filled or cancelled. A position with zero quantity is inactive and is
/// excluded from metric passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionState {
    /// Signed net quantity
    pub quantity: i64,
    /// Signed sum of in-flight order quantities
    pub pending_qty: i64,
    /// Volume-weighted average entry price
    pub avg_price: f64,
    /// Realized profit and loss accumulated from closed trades
    pub realized_pnl: f64,
    /// Last observed market price
    pub last_price: f64,
}

impl PositionState {
    /// Whether this position holds a non-zero quantity
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.quantity != 0
    }

    /// Current market value at the last observed price
    #[inline]
    #[must_use]
    pub fn market_value(&self) -> f64 {
        self.quantity as f64 * self.last_price
    }

    /// Unrealized profit at the last observed price
    #[inline]
    #[must_use]
    pub fn unrealized_pnl(&self) -> f64 {
        self.quantity as f64 * (self.last_price - self.avg_price)
    }

    /// Apply a signed fill to the position, returning the realized P&L of
    /// the closed portion (zero when adding or opening).
    ///
    /// - Same-sign fills (or opening from flat) re-average the cost basis.
    /// - Opposing fills realize `closed * (price - avg) * sign(old)`; the
    ///   basis is unchanged on a reduce, reset to zero on a clean close,
    ///   and reset to the fill price on a side flip.
    pub fn apply_fill(&mut self, signed_qty: i64, price: f64) -> f64 {
        let old = self.quantity;
        let same_direction = (old >= 0 && signed_qty > 0) || (old <= 0 && signed_qty < 0);

        if same_direction {
            let old_notional = self.avg_price * old.abs() as f64;
            let new_notional = price * signed_qty.abs() as f64;
            self.quantity += signed_qty;
            self.avg_price = (old_notional + new_notional) / self.quantity.abs() as f64;
            return 0.0;
        }

        let closing = old.abs().min(signed_qty.abs());
        let direction = if old > 0 { 1.0 } else { -1.0 };
        let pnl = closing as f64 * (price - self.avg_price) * direction;
        self.realized_pnl += pnl;
        self.quantity += signed_qty;

        if self.quantity == 0 {
            self.avg_price = 0.0;
        } else if (old > 0) != (self.quantity > 0) {
            // Flipped sides: the basis restarts at the execution price.
            self.avg_price = price;
        }

        pnl
    }
}
