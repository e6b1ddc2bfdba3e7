//! Event model for the engine: the five event shapes and their tagged union.
//!
//! Events move by value through the dispatcher's FIFO queue. The set is
//! closed, so the union is an explicit enum with exhaustive dispatch rather
//! than a trait-object hierarchy.

use serde::{Deserialize, Serialize};

use crate::types::{OrderFlags, OrderId, OrderType, Side, Timestamp};

/// A single market trade observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Trade symbol
    pub symbol: String,
    /// Trade price
    pub price: f64,
    /// Quantity of the base asset traded
    pub quantity: f64,
    /// Epoch timestamp of the trade in milliseconds
    pub timestamp_ms: i64,
    /// True if the buyer initiated the trade (aggressive buy)
    pub buyer_initiated: bool,
}

impl MarketEvent {
    /// Create a new market event
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        quantity: f64,
        timestamp_ms: i64,
        buyer_initiated: bool,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            quantity,
            timestamp_ms,
            buyer_initiated,
        }
    }

    /// Event timestamp at nanosecond resolution
    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        Timestamp::from_millis(self.timestamp_ms)
    }

    /// Check that price and quantity are positive and finite
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.price.is_finite()
            && self.price > 0.0
            && self.quantity.is_finite()
            && self.quantity > 0.0
    }
}

/// A strategy's internal decision event. Carries no required payload; the
/// strategy keeps whatever context it needs on its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignalEvent;

/// An order submitted toward the execution path. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Trade symbol
    pub symbol: String,
    /// Unique order identifier
    pub id: OrderId,
    /// Total requested quantity (positive)
    pub quantity: i64,
    /// Order side
    pub side: Side,
    /// Limit price; ignored for Market, trigger for StopMarket, both
    /// trigger and limit for StopLimit
    pub price: f64,
    /// Order type
    pub order_type: OrderType,
    /// Execution flags
    pub flags: OrderFlags,
    /// Submission timestamp
    pub timestamp: Timestamp,
    /// Market event that triggered this order, for traceability
    pub origin: Option<Box<MarketEvent>>,
}

impl OrderEvent {
    /// Create a market order
    #[must_use]
    pub fn market(
        symbol: impl Into<String>,
        id: OrderId,
        quantity: i64,
        side: Side,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            id,
            quantity,
            side,
            price: 0.0,
            order_type: OrderType::Market,
            flags: OrderFlags::NONE,
            timestamp,
            origin: None,
        }
    }

    /// Create a limit order
    #[must_use]
    pub fn limit(
        symbol: impl Into<String>,
        id: OrderId,
        quantity: i64,
        side: Side,
        price: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            id,
            quantity,
            side,
            price,
            order_type: OrderType::Limit,
            flags: OrderFlags::NONE,
            timestamp,
            origin: None,
        }
    }

    /// Create a stop-market order triggering at `stop_price`
    #[must_use]
    pub fn stop_market(
        symbol: impl Into<String>,
        id: OrderId,
        quantity: i64,
        side: Side,
        stop_price: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            id,
            quantity,
            side,
            price: stop_price,
            order_type: OrderType::StopMarket,
            flags: OrderFlags::NONE,
            timestamp,
            origin: None,
        }
    }

    /// Create a stop-limit order; `price` is both trigger and limit
    #[must_use]
    pub fn stop_limit(
        symbol: impl Into<String>,
        id: OrderId,
        quantity: i64,
        side: Side,
        price: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            id,
            quantity,
            side,
            price,
            order_type: OrderType::StopLimit,
            flags: OrderFlags::NONE,
            timestamp,
            origin: None,
        }
    }

    /// Attach execution flags
    #[must_use]
    pub fn with_flags(mut self, flags: OrderFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attach the market event that triggered this order
    #[must_use]
    pub fn with_origin(mut self, origin: MarketEvent) -> Self {
        self.origin = Some(Box::new(origin));
        self
    }

    /// Signed quantity (positive for buy, negative for sell)
    #[inline]
    #[must_use]
    pub const fn signed_quantity(&self) -> i64 {
        self.side.signed(self.quantity)
    }
}

/// An execution report for part or all of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillEvent {
    /// The originating order, carried by value
    pub order: OrderEvent,
    /// Quantity filled in this report
    pub filled_qty: i64,
    /// Total quantity of the originating order
    pub order_qty: i64,
    /// Side of the fill
    pub side: Side,
    /// Execution price
    pub price: f64,
    /// Fill timestamp
    pub timestamp: Timestamp,
}

impl FillEvent {
    /// Symbol of the filled order
    #[inline]
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.order.symbol
    }

    /// Id of the filled order
    #[inline]
    #[must_use]
    pub const fn order_id(&self) -> OrderId {
        self.order.id
    }

    /// Signed fill quantity (positive for buy, negative for sell)
    #[inline]
    #[must_use]
    pub const fn signed_quantity(&self) -> i64 {
        self.side.signed(self.filled_qty)
    }

    /// Whether this fill leaves part of the order unfilled
    #[inline]
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.filled_qty < self.order_qty
    }

    /// Notional value of this fill
    #[inline]
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.filled_qty as f64
    }
}

/// A cancellation report for a working order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelEvent {
    /// The originating order, carried by value
    pub order: OrderEvent,
    /// Human-readable cancellation reason
    pub reason: String,
    /// Cancellation timestamp
    pub timestamp: Timestamp,
}

/// Unified event type routed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// New market data
    Market(MarketEvent),
    /// Strategy decision trigger
    Signal(SignalEvent),
    /// Order submission
    Order(OrderEvent),
    /// Execution report
    Fill(FillEvent),
    /// Cancellation report
    Cancel(CancelEvent),
}

impl Event {
    /// Short name of the variant, for logging and metrics labels
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Event::Market(_) => "market",
            Event::Signal(_) => "signal",
            Event::Order(_) => "order",
            Event::Fill(_) => "fill",
            Event::Cancel(_) => "cancel",
        }
    }
}

impl From<MarketEvent> for Event {
    fn from(ev: MarketEvent) -> Self {
        Event::Market(ev)
    }
}

impl From<SignalEvent> for Event {
    fn from(ev: SignalEvent) -> Self {
        Event::Signal(ev)
    }
}

impl From<OrderEvent> for Event {
    fn from(ev: OrderEvent) -> Self {
        Event::Order(ev)
    }
}

impl From<FillEvent> for Event {
    fn from(ev: FillEvent) -> Self {
        Event::Fill(ev)
    }
}

impl From<CancelEvent> for Event {
    fn from(ev: CancelEvent) -> Self {
        Event::Cancel(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_event_validity() {
        let good = MarketEvent::new("BTCUSD", 100.0, 2.5, 1_700_000_000_000, true);
        assert!(good.is_valid());
        assert_eq!(good.timestamp().as_millis(), 1_700_000_000_000);

        let bad_price = MarketEvent::new("BTCUSD", -1.0, 2.5, 0, true);
        assert!(!bad_price.is_valid());

        let nan_price = MarketEvent::new("BTCUSD", f64::NAN, 2.5, 0, true);
        assert!(!nan_price.is_valid());
    }

    #[test]
    fn test_order_constructors() {
        let ts = Timestamp::from_millis(1);
        let market = OrderEvent::market("BTCUSD", OrderId::new(1), 10, Side::Buy, ts);
        assert_eq!(market.order_type, OrderType::Market);
        assert_eq!(market.signed_quantity(), 10);

        let limit = OrderEvent::limit("BTCUSD", OrderId::new(2), 10, Side::Sell, 99.5, ts);
        assert_eq!(limit.order_type, OrderType::Limit);
        assert_eq!(limit.signed_quantity(), -10);

        let stop = OrderEvent::stop_market("BTCUSD", OrderId::new(3), 5, Side::Sell, 95.0, ts)
            .with_flags(OrderFlags::REDUCE_ONLY);
        assert!(stop.order_type.is_stop());
        assert!(stop.flags.is_reduce_only());
    }

    #[test]
    fn test_order_origin_traceability() {
        let tick = MarketEvent::new("BTCUSD", 100.0, 1.0, 5, false);
        let order = OrderEvent::market(
            "BTCUSD",
            OrderId::new(1),
            1,
            Side::Buy,
            Timestamp::from_millis(5),
        )
        .with_origin(tick.clone());

        assert_eq!(order.origin.as_deref(), Some(&tick));
    }

    #[test]
    fn test_fill_accessors() {
        let ts = Timestamp::from_millis(1);
        let order = OrderEvent::market("BTCUSD", OrderId::new(7), 10, Side::Sell, ts);
        let fill = FillEvent {
            order,
            filled_qty: 4,
            order_qty: 10,
            side: Side::Sell,
            price: 101.0,
            timestamp: ts,
        };

        assert_eq!(fill.symbol(), "BTCUSD");
        assert_eq!(fill.order_id(), OrderId::new(7));
        assert_eq!(fill.signed_quantity(), -4);
        assert!(fill.is_partial());
        assert!((fill.notional() - 404.0).abs() < 1e-12);
    }

    #[test]
    fn test_event_kind() {
        let ev: Event = SignalEvent.into();
        assert_eq!(ev.kind(), "signal");
    }

    #[test]
    fn test_event_serde_round_trip() {
        let ts = Timestamp::from_millis(7);
        let order = OrderEvent::limit("BTCUSD", OrderId::new(3), 4, Side::Buy, 100.5, ts)
            .with_flags(OrderFlags::IOC);
        let ev: Event = order.into();

        let json = serde_json::to_string(&ev).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
