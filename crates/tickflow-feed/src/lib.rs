//! # tickflow-feed
//!
//! Market tick sources for the tickflow trading engine.
//!
//! This crate provides:
//! - `ReplaySource`: drains an in-memory tick sequence
//! - `TickFileReader` / `TickFileWriter`: fixed-width little-endian binary
//!   tick files, decoded with `nom`
//! - `SyntheticSource`: seeded random-walk generator for development and
//!   load testing
//!
//! All sources implement `tickflow_core::traits::MarketSource`.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

pub mod error;
pub mod file;
pub mod replay;
pub mod synthetic;

pub use error::{FeedError, FeedResult};
pub use file::{TickFileReader, TickFileWriter, TICK_RECORD_SIZE};
pub use replay::ReplaySource;
pub use synthetic::{SyntheticConfig, SyntheticSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{FeedError, FeedResult};
    pub use crate::file::{TickFileReader, TickFileWriter};
    pub use crate::replay::ReplaySource;
    pub use crate::synthetic::{SyntheticConfig, SyntheticSource};
}
