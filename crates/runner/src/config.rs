//! Configuration loading for the session runner
//!
//! A single JSON file with four optional sections:
//! - `exchange` - venue, product and (opaque) API credentials
//! - `ledger` - depth table size, depth cadence, trade log bound
//! - `execution` - placement timeout, retry backoff, reconcile interval
//! - `simulation` - paper exchange and market activity parameters
//!
//! Every field has a default, so `{}` is a valid configuration.

use hermes_execution::ExecutionConfig;
use hermes_gateway::SimulatedExchangeConfig;
use hermes_ledger::LedgerConfig;
use hermes_ports::AccountBalance;
use hermes_state::StoreConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::activity::MarketActivityConfig;

pub const SUPPORTED_EXCHANGES: [&str; 1] = ["coinbase"];
pub const SUPPORTED_PRODUCTS: [&str; 3] = ["BTC-USD", "ETH-USD", "LTC-USD"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unsupported exchange: {0}")]
    UnsupportedExchange(String),

    #[error("Unsupported product: {0}")]
    UnsupportedProduct(String),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub exchange: ExchangeSection,
    #[serde(default)]
    pub ledger: LedgerSection,
    #[serde(default)]
    pub execution: ExecutionSection,
    #[serde(default)]
    pub simulation: SimulationSection,
}

impl RunnerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_EXCHANGES.contains(&self.exchange.name.as_str()) {
            return Err(ConfigError::UnsupportedExchange(self.exchange.name.clone()));
        }
        if !SUPPORTED_PRODUCTS.contains(&self.exchange.product.as_str()) {
            return Err(ConfigError::UnsupportedProduct(self.exchange.product.clone()));
        }

        non_zero("ledger.depth_levels", self.ledger.depth_levels as u64)?;
        non_zero("ledger.depth_interval_ms", self.ledger.depth_interval_ms)?;
        non_zero("ledger.trade_log_capacity", self.ledger.trade_log_capacity as u64)?;
        non_zero("execution.order_timeout_ms", self.execution.order_timeout_ms)?;
        non_zero("execution.reconcile_interval_ms", self.execution.reconcile_interval_ms)?;
        non_zero("simulation.activity_interval_ms", self.simulation.activity_interval_ms)?;
        non_zero("simulation.monitor_interval_ms", self.simulation.monitor_interval_ms)?;

        if !(0.0..=1.0).contains(&self.simulation.reject_rate) {
            return Err(ConfigError::Invalid {
                field: "simulation.reject_rate",
                reason: format!("{} is outside [0, 1]", self.simulation.reject_rate),
            });
        }
        if self.simulation.initial_price <= Decimal::ZERO {
            return Err(ConfigError::Invalid {
                field: "simulation.initial_price",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            instrument_id: self.exchange.product.clone(),
            depth_levels: self.ledger.depth_levels,
            trade_log_capacity: self.ledger.trade_log_capacity,
        }
    }

    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            depth_interval: Duration::from_millis(self.ledger.depth_interval_ms),
        }
    }

    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            order_timeout: Duration::from_millis(self.execution.order_timeout_ms),
            retry_backoff: Duration::from_millis(self.execution.retry_backoff_ms),
            reconcile_interval: Duration::from_millis(self.execution.reconcile_interval_ms),
        }
    }

    pub fn exchange_config(&self) -> SimulatedExchangeConfig {
        SimulatedExchangeConfig {
            instrument_id: self.exchange.product.clone(),
            reject_rate: self.simulation.reject_rate,
            seed: self.simulation.seed,
            balances: self
                .simulation
                .balances
                .iter()
                .map(|b| AccountBalance {
                    currency: b.currency.clone(),
                    balance: b.amount,
                    available: b.amount,
                })
                .collect(),
        }
    }

    pub fn activity_config(&self) -> MarketActivityConfig {
        MarketActivityConfig {
            initial_price: self.simulation.initial_price,
            volatility: self.simulation.volatility,
            tick_size: self.simulation.tick_size,
            max_order_size: self.simulation.max_order_size,
            take_probability: self.simulation.take_probability,
            cancel_probability: self.simulation.cancel_probability,
            seed: self.simulation.seed,
        }
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Exchange selection and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSection {
    #[serde(default = "default_exchange_name")]
    pub name: String,
    #[serde(default = "default_product")]
    pub product: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_websocket_url")]
    pub websocket_url: String,
    /// Carried as-is; a paper session never uses them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b64secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

fn default_exchange_name() -> String {
    "coinbase".to_string()
}

fn default_product() -> String {
    "BTC-USD".to_string()
}

fn default_api_url() -> String {
    "https://api.pro.coinbase.com".to_string()
}

fn default_websocket_url() -> String {
    "wss://ws-feed.pro.coinbase.com".to_string()
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            name: default_exchange_name(),
            product: default_product(),
            api_url: default_api_url(),
            websocket_url: default_websocket_url(),
            key: None,
            b64secret: None,
            passphrase: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,
    #[serde(default = "default_depth_interval_ms")]
    pub depth_interval_ms: u64,
    #[serde(default = "default_trade_log_capacity")]
    pub trade_log_capacity: usize,
}

fn default_depth_levels() -> usize {
    5
}

fn default_depth_interval_ms() -> u64 {
    500
}

fn default_trade_log_capacity() -> usize {
    10_000
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            depth_levels: default_depth_levels(),
            depth_interval_ms: default_depth_interval_ms(),
            trade_log_capacity: default_trade_log_capacity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSection {
    #[serde(default = "default_order_timeout_ms")]
    pub order_timeout_ms: u64,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_reconcile_interval_ms")]
    pub reconcile_interval_ms: u64,
}

fn default_order_timeout_ms() -> u64 {
    5_000
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}

fn default_reconcile_interval_ms() -> u64 {
    10_000
}

impl Default for ExecutionSection {
    fn default() -> Self {
        Self {
            order_timeout_ms: default_order_timeout_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
            reconcile_interval_ms: default_reconcile_interval_ms(),
        }
    }
}

/// Paper exchange and market activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Share of placements answered without an order id
    #[serde(default = "default_reject_rate")]
    pub reject_rate: f64,
    #[serde(default = "default_initial_price")]
    pub initial_price: Decimal,
    /// Random walk step as a fraction of price
    #[serde(default = "default_volatility")]
    pub volatility: f64,
    #[serde(default = "default_tick_size")]
    pub tick_size: Decimal,
    #[serde(default = "default_max_order_size")]
    pub max_order_size: Decimal,
    #[serde(default = "default_take_probability")]
    pub take_probability: f64,
    #[serde(default = "default_cancel_probability")]
    pub cancel_probability: f64,
    #[serde(default = "default_activity_interval_ms")]
    pub activity_interval_ms: u64,
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
    /// Rolling window kept in the trade log
    #[serde(default = "default_trade_window_secs")]
    pub trade_window_secs: u64,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,
    #[serde(default = "default_balances")]
    pub balances: Vec<BalanceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceConfig {
    pub currency: String,
    pub amount: Decimal,
}

fn default_seed() -> u64 {
    42
}

fn default_reject_rate() -> f64 {
    0.1
}

fn default_initial_price() -> Decimal {
    dec!(50000)
}

fn default_volatility() -> f64 {
    0.0005
}

fn default_tick_size() -> Decimal {
    dec!(0.01)
}

fn default_max_order_size() -> Decimal {
    dec!(0.5)
}

fn default_take_probability() -> f64 {
    0.3
}

fn default_cancel_probability() -> f64 {
    0.2
}

fn default_activity_interval_ms() -> u64 {
    200
}

fn default_monitor_interval_ms() -> u64 {
    1_000
}

fn default_trade_window_secs() -> u64 {
    10
}

fn default_duration_secs() -> u64 {
    30
}

fn default_balances() -> Vec<BalanceConfig> {
    vec![
        BalanceConfig {
            currency: "USD".to_string(),
            amount: dec!(100000),
        },
        BalanceConfig {
            currency: "BTC".to_string(),
            amount: dec!(2),
        },
    ]
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            reject_rate: default_reject_rate(),
            initial_price: default_initial_price(),
            volatility: default_volatility(),
            tick_size: default_tick_size(),
            max_order_size: default_max_order_size(),
            take_probability: default_take_probability(),
            cancel_probability: default_cancel_probability(),
            activity_interval_ms: default_activity_interval_ms(),
            monitor_interval_ms: default_monitor_interval_ms(),
            trade_window_secs: default_trade_window_secs(),
            duration_secs: default_duration_secs(),
            balances: default_balances(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = RunnerConfig::from_json("{}").unwrap();
        assert_eq!(config.exchange.name, "coinbase");
        assert_eq!(config.exchange.product, "BTC-USD");
        assert_eq!(config.ledger.depth_levels, 5);
        assert_eq!(config.execution.order_timeout_ms, 5_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config = RunnerConfig::from_json(
            r#"{
                "exchange": {"product": "ETH-USD", "key": "k", "b64secret": "s", "passphrase": "p"},
                "ledger": {"depth_levels": 10},
                "simulation": {"initial_price": "3000", "reject_rate": 0.0}
            }"#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.store_config().instrument_id, "ETH-USD");
        assert_eq!(config.store_config().depth_levels, 10);
        assert_eq!(config.ledger.depth_interval_ms, 500);
        assert_eq!(config.exchange.key.as_deref(), Some("k"));
        assert_eq!(config.activity_config().initial_price, dec!(3000));
        assert_eq!(
            config.execution_config().reconcile_interval,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_validation_failures() {
        let config = RunnerConfig::from_json(r#"{"exchange": {"name": "kraken"}}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedExchange(_))
        ));

        let config = RunnerConfig::from_json(r#"{"exchange": {"product": "DOGE-USD"}}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsupportedProduct(_))
        ));

        let config = RunnerConfig::from_json(r#"{"ledger": {"depth_levels": 0}}"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "ledger.depth_levels",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RunnerConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RunnerConfig::from_file("/nonexistent/hermes.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
