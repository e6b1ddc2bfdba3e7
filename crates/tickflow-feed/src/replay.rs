//! In-memory tick replay source.

use std::collections::VecDeque;

use tickflow_core::traits::{MarketSource, Tick};

/// Drains a pre-built tick sequence in order. The workhorse source for
/// deterministic tests and small replays.
#[derive(Debug, Default)]
pub struct ReplaySource {
    ticks: VecDeque<Tick>,
}

impl ReplaySource {
    /// Create a source over the given ticks
    #[must_use]
    pub fn new(ticks: Vec<Tick>) -> Self {
        Self {
            ticks: ticks.into(),
        }
    }

    /// Ticks remaining
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.ticks.len()
    }
}

impl MarketSource for ReplaySource {
    fn next(&mut self) -> Option<Tick> {
        self.ticks.pop_front()
    }
}

impl FromIterator<Tick> for ReplaySource {
    fn from_iter<I: IntoIterator<Item = Tick>>(iter: I) -> Self {
        Self {
            ticks: iter.into_iter().collect(),
        }
    }
}
