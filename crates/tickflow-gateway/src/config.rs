//! Application configuration.

use serde::{Deserialize, Serialize};

use tickflow_feed::SyntheticConfig;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name
    pub name: String,
    /// Log level
    pub log_level: String,
    /// Metrics port
    pub metrics_port: u16,
    /// Trading configuration
    pub trading: TradingConfig,
    /// Synthetic data configuration
    pub synthetic: SyntheticConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "tickflow".to_string(),
            log_level: "info".to_string(),
            metrics_port: 9090,
            trading: TradingConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Trading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingConfig {
    /// Starting cash balance
    pub starting_cash: f64,
    /// Maximum absolute position per symbol
    pub max_position: i64,
    /// Maximum single order size
    pub max_order_size: i64,
    /// Maximum notional exposure per symbol
    pub max_notional: f64,
    /// Momentum trigger threshold (fractional move)
    pub momentum_threshold: f64,
    /// Momentum order size
    pub momentum_order_size: i64,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            starting_cash: 1_000_000.0,
            max_position: 50,
            max_order_size: 10,
            max_notional: 1e7,
            momentum_threshold: 0.002,
            momentum_order_size: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// I/O or TOML parse failure.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the `TICKFLOW_CONFIG` environment variable with fallback
    /// to defaults
    ///
    /// # Errors
    ///
    /// I/O or TOML parse failure when the variable points at a file.
    pub fn from_env() -> anyhow::Result<Self> {
        if let Ok(path) = std::env::var("TICKFLOW_CONFIG") {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// I/O or TOML serialization failure.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::default();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.name, "tickflow");
        assert_eq!(loaded.trading.max_position, 50);
        assert_eq!(loaded.synthetic.symbols, vec!["BTCUSD".to_string()]);
    }
}
