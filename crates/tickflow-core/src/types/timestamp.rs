//! Nanosecond-precision timestamp for the event stream.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::time::{SystemTime, UNIX_EPOCH};

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{NS_PER_MS, NS_PER_SEC};

/// Nanosecond-precision timestamp since Unix epoch.
///
/// Market ticks carry epoch milliseconds on the wire and are widened to
/// nanoseconds on ingest so internal timestamps share one resolution.
///
/// # Example
///
/// ```rust
/// use tickflow_core::types::Timestamp;
///
/// let ts = Timestamp::from_millis(1_700_000_000_000);
/// let later = ts.add_nanos(1000);
/// assert!(later > ts);
/// ```
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
pub struct Timestamp(i64);

impl Timestamp {
    /// Zero timestamp (Unix epoch)
    pub const EPOCH: Self = Self(0);

    /// Maximum timestamp
    pub const MAX: Self = Self(i64::MAX);

    /// Create a timestamp from nanoseconds since epoch
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * NS_PER_MS)
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * NS_PER_SEC)
    }

    /// Get the current wall-clock timestamp
    #[inline]
    #[must_use]
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self(duration.as_nanos() as i64)
    }

    /// Get nanoseconds since epoch
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Get milliseconds since epoch
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0 / NS_PER_MS
    }

    /// Get seconds since epoch
    #[inline]
    #[must_use]
    pub const fn as_secs(self) -> i64 {
        self.0 / NS_PER_SEC
    }

    /// Add nanoseconds to this timestamp
    #[inline]
    #[must_use]
    pub const fn add_nanos(self, nanos: i64) -> Self {
        Self(self.0 + nanos)
    }

    /// Nanoseconds elapsed since an earlier timestamp
    #[inline]
    #[must_use]
    pub const fn duration_since(self, earlier: Self) -> i64 {
        self.0 - earlier.0
    }
}

impl PartialOrd for Timestamp {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add<i64> for Timestamp {
    type Output = Self;

    #[inline]
    fn add(self, nanos: i64) -> Self {
        Self(self.0 + nanos)
    }
}

impl Sub for Timestamp {
    type Output = i64;

    #[inline]
    fn sub(self, other: Self) -> i64 {
        self.0 - other.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
