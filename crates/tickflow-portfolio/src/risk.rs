//! Per-symbol pre-trade risk limits.

use serde::{Deserialize, Serialize};

use tickflow_core::constants::{
    DEFAULT_MAX_NOTIONAL, DEFAULT_MAX_ORDER_SIZE, DEFAULT_MAX_POSITION,
};

/// Pre-trade limits applied per symbol.
///
/// Every symbol slot carries defaults, so a missing configuration never
/// blocks dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLimits {
    /// Maximum absolute position
    pub max_position: i64,
    /// Maximum single order size
    pub max_order_size: i64,
    /// Maximum notional exposure
    pub max_notional: f64,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position: DEFAULT_MAX_POSITION,
            max_order_size: DEFAULT_MAX_ORDER_SIZE,
            max_notional: DEFAULT_MAX_NOTIONAL,
        }
    }
}

impl RiskLimits {
    /// Create explicit limits
    #[must_use]
    pub const fn new(max_position: i64, max_order_size: i64, max_notional: f64) -> Self {
        Self {
            max_position,
            max_order_size,
            max_notional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = RiskLimits::default();
        assert_eq!(limits.max_position, 1_000);
        assert_eq!(limits.max_order_size, 100);
        assert_eq!(limits.max_notional, 1e6);
    }
}
