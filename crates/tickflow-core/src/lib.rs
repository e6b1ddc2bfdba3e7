//! # tickflow-core
//!
//! Core types, events, and traits for the tickflow trading engine.
//!
//! This crate provides:
//! - Domain types: `OrderId`, `SymbolId`, `Side`, `OrderType`, `OrderFlags`,
//!   `Timestamp`
//! - The tagged event union routed by the dispatcher
//! - The FIFO event queue wiring the components together
//! - External-contract traits: `MarketSource`, `Strategy`, `OrderBus`
//!
//! ## Example
//!
//! ```rust
//! use tickflow_core::events::{Event, MarketEvent};
//! use tickflow_core::queue::EventQueue;
//!
//! let mut queue = EventQueue::new();
//! queue.push(MarketEvent::new("BTCUSD", 100.0, 1.0, 0, true));
//! assert!(matches!(queue.pop().unwrap(), Event::Market(_)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod constants;
pub mod error;
pub mod events;
pub mod queue;
pub mod traits;
pub mod types;

pub use error::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::constants::*;
    pub use crate::error::{Error, Result};
    pub use crate::events::{CancelEvent, Event, FillEvent, MarketEvent, OrderEvent, SignalEvent};
    pub use crate::queue::EventQueue;
    pub use crate::traits::{MarketSource, NullBus, OrderBus, RecordingBus, Strategy, Tick};
    pub use crate::types::{
        OrderFlags, OrderId, OrderType, Side, SymbolId, SymbolTable, Timestamp,
    };
}
