//! Configuration management for the stock ledger
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with STOCKLEDGER_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Ledger engine and projector tuning
    pub ledger: LedgerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Compare-and-swap retries before a mutation gives up
    pub max_retries: u32,

    /// Days shown by the movement chart
    pub chart_window_days: u32,

    /// Longest chart a caller may request with `?days=`
    pub max_chart_window_days: u32,

    /// Low stock products listed on the dashboard
    pub low_stock_list_limit: usize,

    /// Products listed in the stock value ranking
    pub top_products_limit: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::services::ledger::DEFAULT_MAX_RETRIES,
            chart_window_days: shared::DEFAULT_CHART_WINDOW_DAYS,
            max_chart_window_days: shared::MAX_CHART_WINDOW_DAYS,
            low_stock_list_limit: 5,
            top_products_limit: 10,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKLEDGER_ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let ledger = LedgerConfig::default();

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("ledger.max_retries", i64::from(ledger.max_retries))?
            .set_default("ledger.chart_window_days", i64::from(ledger.chart_window_days))?
            .set_default(
                "ledger.max_chart_window_days",
                i64::from(ledger.max_chart_window_days),
            )?
            .set_default("ledger.low_stock_list_limit", ledger.low_stock_list_limit as i64)?
            .set_default("ledger.top_products_limit", ledger.top_products_limit as i64)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKLEDGER_ prefix)
            .add_source(
                Environment::with_prefix("STOCKLEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Message(
                "database.min_connections exceeds database.max_connections".to_string(),
            ));
        }
        if self.ledger.chart_window_days == 0 {
            return Err(ConfigError::Message(
                "ledger.chart_window_days must be at least 1".to_string(),
            ));
        }
        if self.ledger.max_chart_window_days > shared::MAX_CHART_WINDOW_DAYS {
            return Err(ConfigError::Message(format!(
                "ledger.max_chart_window_days cannot exceed {}",
                shared::MAX_CHART_WINDOW_DAYS
            )));
        }
        if self.ledger.chart_window_days > self.ledger.max_chart_window_days {
            return Err(ConfigError::Message(
                "ledger.chart_window_days exceeds ledger.max_chart_window_days".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
