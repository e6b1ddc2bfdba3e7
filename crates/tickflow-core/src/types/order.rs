//! Order identifier, order type, and execution-flag types.

use std::fmt;

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

/// Unique order identifier
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct OrderId(u64);

impl OrderId {
    /// Create a new order ID
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OrderId({})", self.0)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<OrderId> for u64 {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Order type
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
#[repr(u8)]
#[derive(Default)]
pub enum OrderType {
    /// Market order - execute at best available price
    #[default]
    Market = 0,
    /// Limit order - execute at the limit price or better
    Limit = 1,
    /// Stop order - trigger at stop price, then execute as market
    StopMarket = 2,
    /// Stop-limit order - trigger at stop price, then rest as limit
    StopLimit = 3,
}

impl OrderType {
    /// Check if this order type rests untriggered until a stop price is hit
    #[inline]
    #[must_use]
    pub const fn is_stop(self) -> bool {
        matches!(self, OrderType::StopMarket | OrderType::StopLimit)
    }
}

impl fmt::Debug for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "Market"),
            OrderType::Limit => write!(f, "Limit"),
            OrderType::StopMarket => write!(f, "StopMarket"),
            OrderType::StopLimit => write!(f, "StopLimit"),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Execution-flag bitset for orders.
///
/// Flags compose freely; `OrderFlags::IOC | OrderFlags::REDUCE_ONLY` is a
/// valid set. The empty set is the default.
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Archive,
    RkyvSerialize,
    RkyvDeserialize,
)]
#[archive(check_bytes)]
pub struct OrderFlags(u8);

impl OrderFlags {
    /// No flags set
    pub const NONE: Self = Self(0);

    /// Immediate-or-cancel: fill what is possible now, cancel the rest
    pub const IOC: Self = Self(1 << 0);

    /// Fill-or-kill: fill completely now or cancel entirely
    pub const FOK: Self = Self(1 << 1);

    /// Post-only: cancel instead of taking liquidity
    pub const POST_ONLY: Self = Self(1 << 2);

    /// Reduce-only: only ever shrink an existing position
    pub const REDUCE_ONLY: Self = Self(1 << 3);

    /// Create from a raw bit pattern
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x0F)
    }

    /// Get the raw bit pattern
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check whether every flag in `other` is set
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether no flags are set
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check the immediate-or-cancel flag
    #[inline]
    #[must_use]
    pub const fn is_ioc(self) -> bool {
        self.contains(Self::IOC)
    }

    /// Check the fill-or-kill flag
    #[inline]
    #[must_use]
    pub const fn is_fok(self) -> bool {
        self.contains(Self::FOK)
    }

    /// Check the post-only flag
    #[inline]
    #[must_use]
    pub const fn is_post_only(self) -> bool {
        self.contains(Self::POST_ONLY)
    }

    /// Check the reduce-only flag
    #[inline]
    #[must_use]
    pub const fn is_reduce_only(self) -> bool {
        self.contains(Self::REDUCE_ONLY)
    }
}

impl std::ops::BitOr for OrderFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for OrderFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for OrderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "OrderFlags(NONE)");
        }
        let mut parts = Vec::new();
        if self.is_ioc() {
            parts.push("IOC");
        }
        if self.is_fok() {
            parts.push("FOK");
        }
        if self.is_post_only() {
            parts.push("POST_ONLY");
        }
        if self.is_reduce_only() {
            parts.push("REDUCE_ONLY");
        }
        write!(f, "OrderFlags({})", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id() {
        let id = OrderId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(u64::from(id), 42);
        assert_eq!(format!("{id}"), "42");
    }

    #[test]
    fn test_order_type_is_stop() {
        assert!(!OrderType::Market.is_stop());
        assert!(!OrderType::Limit.is_stop());
        assert!(OrderType::StopMarket.is_stop());
        assert!(OrderType::StopLimit.is_stop());
    }

    #[test]
    fn test_flags_compose() {
        let flags = OrderFlags::IOC | OrderFlags::REDUCE_ONLY;
        assert!(flags.is_ioc());
        assert!(flags.is_reduce_only());
        assert!(!flags.is_fok());
        assert!(!flags.is_post_only());
        assert!(flags.contains(OrderFlags::IOC));
        assert!(!flags.contains(OrderFlags::FOK));
    }

    #[test]
    fn test_flags_default_empty() {
        let flags = OrderFlags::default();
        assert!(flags.is_empty());
        assert_eq!(flags, OrderFlags::NONE);
    }

    #[test]
    fn test_flags_from_bits_masks_high_bits() {
        let flags = OrderFlags::from_bits(0xFF);
        assert_eq!(flags.bits(), 0x0F);
    }

    #[test]
    fn test_flags_debug() {
        let flags = OrderFlags::FOK | OrderFlags::POST_ONLY;
        assert_eq!(format!("{flags:?}"), "OrderFlags(FOK|POST_ONLY)");
    }
}
