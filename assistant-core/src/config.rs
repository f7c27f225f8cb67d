// config.rs
// Runtime settings: built-in defaults, optional file, ASSISTANT__* environment overrides

use assistant_common::analysis::AnalysisParams;
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "assistant";

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeSettings {
    pub base_url: String,
    pub recv_window_ms: u64,
    pub timeout_secs: u64,
    pub exchange_info_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CliSettings {
    /// Balances worth less than this (in USD) are hidden.
    #[serde(with = "rust_decimal::serde::str")]
    pub account_min_value: Decimal,
    pub history_limit: u16,
    pub kline_interval: String,
    pub kline_limit: u16,
    pub quote_asset: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub exchange: ExchangeSettings,
    pub analysis: AnalysisParams,
    pub cli: CliSettings,
}

impl Settings {
    /// Load settings from `assistant.toml` (if present) or the given path.
    pub fn new(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = AnalysisParams::default();
        let ema_periods: Vec<i64> = defaults.ema_periods.iter().map(|p| *p as i64).collect();

        let mut builder = Config::builder()
            .set_default("exchange.base_url", "https://api.binance.com")?
            .set_default("exchange.recv_window_ms", 5000)?
            .set_default("exchange.timeout_secs", 30)?
            .set_default("exchange.exchange_info_ttl_secs", 3600)?
            .set_default("analysis.ema_periods", ema_periods)?
            .set_default("analysis.ema_short_period", defaults.ema_short_period as i64)?
            .set_default("analysis.ema_long_period", defaults.ema_long_period as i64)?
            .set_default("analysis.ema_signal_period", defaults.ema_signal_period as i64)?
            .set_default("analysis.rsi_period", defaults.rsi_period as i64)?
            .set_default("analysis.min_data_points", defaults.min_data_points as i64)?
            .set_default("cli.account_min_value", "10")?
            .set_default("cli.history_limit", 100)?
            .set_default("cli.kline_interval", "1d")?
            .set_default("cli.kline_limit", 200)?
            .set_default("cli.quote_asset", "USDT")?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("ASSISTANT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analysis.ema_periods")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate().map_err(ConfigError::Message)?;
        if self.exchange.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "exchange.timeout_secs must be positive".to_string(),
            ));
        }
        if self.exchange.recv_window_ms == 0 || self.exchange.recv_window_ms > 60_000 {
            return Err(ConfigError::Message(
                "exchange.recv_window_ms must be between 1 and 60000".to_string(),
            ));
        }
        Ok(())
    }
}

/// API key pair for signed endpoints.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
}

impl Credentials {
    /// Read `BINANCE_API_KEY` / `BINANCE_API_SECRET`, loading `.env` first.
    /// `None` when either is missing; public endpoints still work then.
    pub fn from_env() -> Option<Self> {
        let _ = dotenvy::dotenv();
        let api_key = std::env::var("BINANCE_API_KEY").ok()?;
        let api_secret = std::env::var("BINANCE_API_SECRET").ok()?;
        if api_key.trim().is_empty() || api_secret.trim().is_empty() {
            return None;
        }
        Some(Self {
            api_key,
            api_secret,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .finish()
    }
}
