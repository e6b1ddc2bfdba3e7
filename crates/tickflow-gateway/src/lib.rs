//! # tickflow-gateway
//!
//! Gateway crate for the tickflow trading engine: configuration, prometheus
//! metrics, and the metrics/health HTTP server used by the `tickflow`
//! binary.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

pub mod config;
pub mod metrics;
pub mod server;

pub use config::{AppConfig, TradingConfig};
pub use metrics::{MetricsControl, MetricsRegistry};
pub use server::{start_metrics_server, AppStatus, ServerState};
