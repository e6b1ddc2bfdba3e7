//! Synthetic tick generation for testing and development.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use tickflow_core::traits::{MarketSource, Tick};

/// Configuration for synthetic tick generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Symbols to generate ticks for
    pub symbols: Vec<String>,
    /// Initial price per symbol
    pub initial_price: f64,
    /// Price change per event (standard-deviation-like scale)
    pub volatility: f64,
    /// Average trade size in units
    pub avg_trade_size: f64,
    /// Start timestamp (epoch milliseconds)
    pub start_time_ms: i64,
    /// Average time between events (milliseconds)
    pub avg_event_interval_ms: i64,
    /// Number of ticks to emit; `None` streams forever
    pub limit: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSD".to_string()],
            initial_price: 50_000.0,
            volatility: 5.0,
            avg_trade_size: 3.0,
            start_time_ms: 1_700_000_000_000, // ~2023
            avg_event_interval_ms: 100,
            limit: Some(100_000),
        }
    }
}

/// Seeded random-walk tick generator over a symbol set.
///
/// Deterministic per seed: two generators with the same config and seed
/// produce identical streams.
#[derive(Debug)]
pub struct SyntheticSource {
    config: SyntheticConfig,
    rng: StdRng,
    prices: Vec<f64>,
    current_time_ms: i64,
    emitted: u64,
}

impl SyntheticSource {
    /// Create a generator with the default seed
    #[must_use]
    pub fn new(config: SyntheticConfig) -> Self {
        Self::with_seed(config, 42)
    }

    /// Create a generator with a specific seed
    #[must_use]
    pub fn with_seed(config: SyntheticConfig, seed: u64) -> Self {
        let prices = vec![config.initial_price; config.symbols.len()];
        Self {
            current_time_ms: config.start_time_ms,
            prices,
            rng: StdRng::seed_from_u64(seed),
            config,
            emitted: 0,
        }
    }

    /// Ticks emitted so far
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Generate the next tick unconditionally
    fn generate(&mut self) -> Tick {
        let idx = if self.config.symbols.len() > 1 {
            self.rng.gen_range(0..self.config.symbols.len())
        } else {
            0
        };

        // Uniform random walk, floored away from zero.
        let step: f64 = self.rng.gen::<f64>() * 2.0 - 1.0;
        self.prices[idx] = (self.prices[idx] + step * self.config.volatility).max(0.01);

        let interval = self.config.avg_event_interval_ms.max(1);
        self.current_time_ms += self.rng.gen_range(interval / 2..=interval * 2).max(1);

        let quantity = self
            .rng
            .gen_range(1.0..=(self.config.avg_trade_size * 2.0).max(1.0));

        self.emitted += 1;
        Tick {
            symbol: self.config.symbols[idx].clone(),
            price: self.prices[idx],
            quantity,
            timestamp_ms: self.current_time_ms,
            buyer_initiated: self.rng.gen_bool(0.5),
        }
    }
}

impl MarketSource for SyntheticSource {
    fn next(&mut self) -> Option<Tick> {
        if let Some(limit) = self.config.limit {
            if self.emitted >= limit {
                return None;
            }
        }
        Some(self.generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_valid_ticks() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            limit: Some(100),
            ..SyntheticConfig::default()
        });

        let mut count = 0;
        let mut last_ts = 0;
        while let Some(tick) = source.next() {
            assert!(tick.price > 0.0);
            assert!(tick.quantity > 0.0);
            assert!(tick.timestamp_ms > last_ts);
            last_ts = tick.timestamp_ms;
            count += 1;
        }
        assert_eq!(count, 100);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = SyntheticConfig {
            limit: Some(20),
            symbols: vec!["BTCUSD".to_string(), "ETHUSD".to_string()],
            ..SyntheticConfig::default()
        };

        let mut a = SyntheticSource::with_seed(config.clone(), 123);
        let mut b = SyntheticSource::with_seed(config, 123);

        loop {
            match (a.next(), b.next()) {
                (Some(x), Some(y)) => assert_eq!(x, y),
                (None, None) => break,
                _ => panic!("streams diverged in length"),
            }
        }
    }

    #[test]
    fn test_limit_ends_stream() {
        let mut source = SyntheticSource::new(SyntheticConfig {
            limit: Some(3),
            ..SyntheticConfig::default()
        });

        assert!(source.next().is_some());
        assert!(source.next().is_some());
        assert!(source.next().is_some());
        assert!(source.next().is_none());
        assert_eq!(source.emitted(), 3);
    }
}
