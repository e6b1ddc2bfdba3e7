//! Dense symbol identifiers and the interning table.

use std::collections::HashMap;
use std::fmt;

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dense symbol identifier in `[0, capacity)`.
///
/// Positions, risk limits, and last prices are indexed by this id so the
/// portfolio hot path is array lookups rather than string hashing.
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
pub struct SymbolId(u32);

impl SymbolId {
    /// Create a new symbol ID
    #[inline]
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Get the value as an array index
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({})", self.0)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SymbolId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Bounded symbol interning table.
///
/// Ids are handed out in first-seen order. The capacity matches the
/// portfolio's symbol universe so an interned id is always a valid index.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    ids: HashMap<String, SymbolId>,
    names: Vec<String>,
    capacity: usize,
}

impl SymbolTable {
    /// Create a table bounded at `capacity` symbols
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up an already-interned symbol
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<SymbolId> {
        self.ids.get(symbol).copied()
    }

    /// Intern a symbol, allocating the next dense id on first sight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SymbolTableFull`] once `capacity` distinct symbols
    /// have been interned.
    pub fn intern(&mut self, symbol: &str) -> Result<SymbolId> {
        if let Some(id) = self.ids.get(symbol) {
            return Ok(*id);
        }
        if self.names.len() >= self.capacity {
            return Err(Error::SymbolTableFull(symbol.to_string()));
        }
        let id = SymbolId::new(self.names.len() as u32);
        self.names.push(symbol.to_string());
        self.ids.insert(symbol.to_string(), id);
        Ok(id)
    }

    /// Resolve an id back to its symbol name
    #[must_use]
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Number of interned symbols
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check whether no symbols are interned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Configured capacity
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
