//! Constants used throughout the tickflow trading engine.

/// Nanoseconds per millisecond
pub const NS_PER_MS: i64 = 1_000_000;

/// Nanoseconds per second
pub const NS_PER_SEC: i64 = 1_000_000_000;

/// Default maximum absolute position per symbol
pub const DEFAULT_MAX_POSITION: i64 = 1_000;

/// Default maximum single order size
pub const DEFAULT_MAX_ORDER_SIZE: i64 = 100;

/// Default maximum notional exposure per symbol
pub const DEFAULT_MAX_NOTIONAL: f64 = 1e6;

/// Default starting cash balance
pub const DEFAULT_STARTING_CASH: f64 = 100_000.0;

/// Default capacity of the historical order ledger
pub const DEFAULT_LEDGER_CAPACITY: usize = 1_024;

/// Width of the symbol field in the binary tick record format
pub const TICK_SYMBOL_WIDTH: usize = 8;
