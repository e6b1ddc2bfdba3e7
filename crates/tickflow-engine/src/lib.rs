//! # tickflow-engine
//!
//! Single-threaded event dispatcher for the tickflow trading engine.
//!
//! The engine polls a market source, wraps ticks as market events, routes
//! every event to the portfolio, execution, and strategy handlers in a
//! defined order, and fully drains the internal FIFO queue after each
//! primary dispatch. Stop, idle, error, and telemetry decisions live behind
//! the [`EngineControl`] hook.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tickflow_engine::{BacktestControl, Engine};
//!
//! let mut engine: Engine<1024, _, _, _, _> =
//!     Engine::new(source, strategy, executor, portfolio, BacktestControl::new());
//! engine.run()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_possible_truncation)]

pub mod control;
pub mod engine;

pub use control::{BacktestControl, EngineControl};
pub use engine::{Engine, PauseHandle};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::control::{BacktestControl, EngineControl};
    pub use crate::engine::{Engine, PauseHandle};
}
