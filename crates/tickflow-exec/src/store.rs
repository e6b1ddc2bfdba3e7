//! Price-time priority store for working orders.
//!
//! Two ordered sets (bids and asks) hold priority keys; the states live in a
//! slot arena so id lookup is O(1) and mutation of fill progress never
//! touches the ordered structure. Insert and remove are O(log n).

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use tickflow_core::constants::DEFAULT_LEDGER_CAPACITY;
use tickflow_core::types::{OrderId, Side, Timestamp};

use crate::ledger::RecencyBuffer;
use crate::state::OrderState;

/// Ordering key for one stored order. `seq` is a store-assigned insertion
/// sequence so that orders at identical price and timestamp still have a
/// total, run-deterministic priority.
#[derive(Debug, Clone, Copy)]
struct PriorityKey {
    price: f64,
    timestamp: Timestamp,
    seq: u64,
    slot: u32,
}

/// Bid priority: higher price wins, then earlier timestamp, then insertion.
#[derive(Debug, Clone, Copy)]
struct BidKey(PriorityKey);

impl Ord for BidKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .price
            .total_cmp(&self.0.price)
            .then_with(|| self.0.timestamp.cmp(&other.0.timestamp))
            .then_with(|| self.0.seq.cmp(&other.0.seq))
    }
}

impl PartialOrd for BidKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for BidKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BidKey {}

/// Ask priority: lower price wins, then earlier timestamp, then insertion.
#[derive(Debug, Clone, Copy)]
struct AskKey(PriorityKey);

impl Ord for AskKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .price
            .total_cmp(&other.0.price)
            .then_with(|| self.0.timestamp.cmp(&other.0.timestamp))
            .then_with(|| self.0.seq.cmp(&other.0.seq))
    }
}

impl PartialOrd for AskKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AskKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AskKey {}

#[derive(Debug, Clone)]
struct Entry {
    state: OrderState,
    key: PriorityKey,
}

/// Dual-sided priced order store with a secondary id index and a bounded
/// historical ledger of retired orders.
#[derive(Debug)]
pub struct OrderStore {
    slots: Vec<Option<Entry>>,
    free: Vec<u32>,
    index: HashMap<OrderId, u32>,
    bids: BTreeSet<BidKey>,
    asks: BTreeSet<AskKey>,
    seq: u64,
    ledger: RecencyBuffer<OrderState>,
}

impl Default for OrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderStore {
    /// Create a store with the default ledger capacity
    #[must_use]
    pub fn new() -> Self {
        Self::with_ledger_capacity(DEFAULT_LEDGER_CAPACITY)
    }

    /// Create a store whose ledger keeps at most `capacity` retired orders
    #[must_use]
    pub fn with_ledger_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            bids: BTreeSet::new(),
            asks: BTreeSet::new(),
            seq: 0,
            ledger: RecencyBuffer::new(capacity),
        }
    }

    /// Insert an order state, replacing any existing entry with the same id.
    pub fn emplace(&mut self, state: OrderState) {
        let id = state.order.id;
        if self.index.contains_key(&id) {
            self.remove_entry(id);
        }

        self.seq += 1;
        let slot = match self.free.pop() {
            Some(s) => s,
            None => {
                self.slots.push(None);
                (self.slots.len() - 1) as u32
            }
        };

        let key = PriorityKey {
            price: state.order.price,
            timestamp: state.order.timestamp,
            seq: self.seq,
            slot,
        };

        match state.order.side {
            Side::Buy => {
                self.bids.insert(BidKey(key));
            }
            Side::Sell => {
                self.asks.insert(AskKey(key));
            }
        }

        self.slots[slot as usize] = Some(Entry { state, key });
        self.index.insert(id, slot);
    }

    /// Look up a stored order state by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&OrderState> {
        let slot = *self.index.get(&id)?;
        self.state_at(slot)
    }

    /// Mutable lookup by id.
    ///
    /// Callers may update fill progress and trigger state; the fields that
    /// participate in ordering (price, timestamp, side) live in the
    /// immutable originating order and must be left alone.
    pub fn get_mut(&mut self, id: OrderId) -> Option<&mut OrderState> {
        let slot = *self.index.get(&id)?;
        self.slots
            .get_mut(slot as usize)?
            .as_mut()
            .map(|e| &mut e.state)
    }

    /// Retire an order: remove it from the live set and append a copy to
    /// the historical ledger. No-op if the id is unknown.
    pub fn inactive(&mut self, id: OrderId) {
        if let Some(state) = self.remove_entry(id) {
            self.ledger.push(state);
        }
    }

    /// Highest-priority bid, if any
    #[must_use]
    pub fn best_bid(&self) -> Option<&OrderState> {
        self.bids.iter().next().and_then(|k| self.state_at(k.0.slot))
    }

    /// Highest-priority ask, if any
    #[must_use]
    pub fn best_ask(&self) -> Option<&OrderState> {
        self.asks.iter().next().and_then(|k| self.state_at(k.0.slot))
    }

    /// Iterate bids in priority order
    pub fn bids(&self) -> impl Iterator<Item = &OrderState> {
        self.bids.iter().filter_map(|k| self.state_at(k.0.slot))
    }

    /// Iterate asks in priority order
    pub fn asks(&self) -> impl Iterator<Item = &OrderState> {
        self.asks.iter().filter_map(|k| self.state_at(k.0.slot))
    }

    /// Visit bids in priority order, then asks in priority order. Each side
    /// stops independently as soon as the visitor returns false.
    pub fn for_each_pruned<F>(&self, mut f: F)
    where
        F: FnMut(&OrderState) -> bool,
    {
        for k in &self.bids {
            if let Some(state) = self.state_at(k.0.slot) {
                if !f(state) {
                    break;
                }
            }
        }
        for k in &self.asks {
            if let Some(state) = self.state_at(k.0.slot) {
                if !f(state) {
                    break;
                }
            }
        }
    }

    /// Number of live orders across both sides
    #[must_use]
    pub fn len(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    /// Check whether both sides are empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Read-only view of the historical ledger
    #[must_use]
    pub fn ledger(&self) -> &RecencyBuffer<OrderState> {
        &self.ledger
    }

    fn state_at(&self, slot: u32) -> Option<&OrderState> {
        self.slots.get(slot as usize)?.as_ref().map(|e| &e.state)
    }

    fn remove_entry(&mut self, id: OrderId) -> Option<OrderState> {
        let slot = self.index.remove(&id)?;
        let entry = self.slots.get_mut(slot as usize)?.take()?;
        match entry.state.order.side {
            Side::Buy => {
                self.bids.remove(&BidKey(entry.key));
            }
            Side::Sell => {
                self.asks.remove(&AskKey(entry.key));
            }
        }
        self.free.push(slot);
        Some(entry.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickflow_core::events::OrderEvent;

    fn order(id: u64, side: Side, price: f64, ts_ms: i64) -> OrderState {
        OrderState::new(OrderEvent::limit(
            "BTCUSD",
            OrderId::new(id),
            10,
            side,
            price,
            Timestamp::from_millis(ts_ms),
        ))
    }

    #[test]
    fn test_bid_price_time_priority() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 5));
        store.emplace(order(2, Side::Buy, 101.0, 9));
        store.emplace(order(3, Side::Buy, 101.0, 3));

        let ids: Vec<u64> = store.bids().map(|s| s.order.id.value()).collect();
        // Highest price first; price tie broken by earlier timestamp.
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(store.best_bid().unwrap().order.id.value(), 3);
    }

    #[test]
    fn test_ask_price_time_priority() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Sell, 100.0, 5));
        store.emplace(order(2, Side::Sell, 99.0, 9));
        store.emplace(order(3, Side::Sell, 99.0, 3));

        let ids: Vec<u64> = store.asks().map(|s| s.order.id.value()).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(store.best_ask().unwrap().order.id.value(), 3);
    }

    #[test]
    fn test_same_price_same_timestamp_is_stable() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 5));
        store.emplace(order(2, Side::Buy, 100.0, 5));

        // Insertion sequence breaks the exact tie.
        let ids: Vec<u64> = store.bids().map(|s| s.order.id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_emplace_is_idempotent() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 5));
        store.emplace(order(1, Side::Buy, 100.0, 5));

        assert_eq!(store.len(), 1);
        assert_eq!(store.bids().count(), 1);
    }

    #[test]
    fn test_get_mut_updates_fill_progress() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 5));

        {
            let state = store.get_mut(OrderId::new(1)).unwrap();
            state.filled_qty = 4;
            state.avg_fill_price = 100.0;
        }

        assert_eq!(store.get(OrderId::new(1)).unwrap().filled_qty, 4);
        // Ordering untouched by the mutation.
        assert_eq!(store.best_bid().unwrap().order.id.value(), 1);
    }

    #[test]
    fn test_inactive_moves_to_ledger() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 5));
        store.emplace(order(2, Side::Sell, 101.0, 5));

        store.inactive(OrderId::new(1));

        assert_eq!(store.len(), 1);
        assert!(store.get(OrderId::new(1)).is_none());
        assert_eq!(store.ledger().len(), 1);
        assert_eq!(
            store.ledger().latest().unwrap().order.id.value(),
            1
        );
    }

    #[test]
    fn test_inactive_unknown_id_is_noop() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 5));

        store.inactive(OrderId::new(99));

        assert_eq!(store.len(), 1);
        assert!(store.ledger().is_empty());
    }

    #[test]
    fn test_for_each_pruned_stops_per_side() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 102.0, 1));
        store.emplace(order(2, Side::Buy, 101.0, 1));
        store.emplace(order(3, Side::Buy, 100.0, 1));
        store.emplace(order(4, Side::Sell, 103.0, 1));
        store.emplace(order(5, Side::Sell, 104.0, 1));

        let mut visited = Vec::new();
        store.for_each_pruned(|state| {
            visited.push(state.order.id.value());
            // Prune each side after its first entry.
            false
        });

        // One best bid, one best ask; pruning one side does not skip the other.
        assert_eq!(visited, vec![1, 4]);
    }

    #[test]
    fn test_slot_reuse_after_retire() {
        let mut store = OrderStore::new();
        store.emplace(order(1, Side::Buy, 100.0, 1));
        store.inactive(OrderId::new(1));
        store.emplace(order(2, Side::Buy, 99.0, 2));

        assert_eq!(store.len(), 1);
        assert_eq!(store.best_bid().unwrap().order.id.value(), 2);
    }
}
