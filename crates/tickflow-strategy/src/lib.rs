//! # tickflow-strategy
//!
//! Strategy scaffolding and reference strategies for the tickflow trading
//! engine. Strategies implement `tickflow_core::traits::Strategy` and push
//! Signal or Order events onto the dispatcher's queue.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod momentum;
pub mod null;

pub use momentum::{MomentumConfig, MomentumStrategy};
pub use null::NullStrategy;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::momentum::{MomentumConfig, MomentumStrategy};
    pub use crate::null::NullStrategy;
}
