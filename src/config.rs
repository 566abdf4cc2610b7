//! Application configuration loaded from environment variables.
//!
//! Every variable is optional; unset or empty values fall back to defaults:
//! - `CANDLESYNC_SYMBOL` (`BTCUSDT`) - trading pair, upper-cased
//! - `CANDLESYNC_INTERVAL` (`1m`) - interval selected at startup
//! - `CANDLESYNC_STYLE` (`candlestick`) - chart style at startup
//! - `CANDLESYNC_HISTORY_LIMIT` (`300`) - candles per snapshot, 1..=1000
//! - `CANDLESYNC_REST_URL` - snapshot REST root
//! - `CANDLESYNC_STREAM_URL` - kline stream root
//! - `CANDLESYNC_RECONNECT` (`true`) - reconnect dropped streams
//! - `CANDLESYNC_LOG_FILE` (`candlesync.log`) - log destination in TUI mode

use std::path::PathBuf;

use crate::ChartError;
use crate::engine::EngineConfig;
use crate::models::{ChartStyle, Interval};

/// Default public REST endpoint.
const DEFAULT_REST_URL: &str = "https://api.binance.com/api/v3";

/// Default public kline stream endpoint.
const DEFAULT_STREAM_URL: &str = "wss://stream.binance.com:9443/ws";

const DEFAULT_SYMBOL: &str = "BTCUSDT";
const DEFAULT_HISTORY_LIMIT: u16 = 300;
const MAX_HISTORY_LIMIT: u16 = 1000;
const DEFAULT_LOG_FILE: &str = "candlesync.log";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chart: ChartConfig,
    pub binance: BinanceConfig,
    pub log_file: PathBuf,
}

/// What to chart and how.
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub symbol: String,
    pub interval: Interval,
    pub style: ChartStyle,
    pub history_limit: u16,
}

/// Binance endpoint configuration values.
#[derive(Debug, Clone)]
pub struct BinanceConfig {
    pub rest_url: String,
    pub stream_url: String,
    pub reconnect: bool,
}

impl ChartConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            symbol: self.symbol.clone(),
            history_limit: self.history_limit,
            style: self.style,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`ChartError::Config`] naming the offending variable if any value
/// cannot be parsed or is out of range.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let symbol = match non_empty_var("CANDLESYNC_SYMBOL") {
        Some(raw) => parse_symbol(&raw)?,
        None => DEFAULT_SYMBOL.to_string(),
    };

    let interval = match non_empty_var("CANDLESYNC_INTERVAL") {
        Some(raw) => raw
            .parse()
            .map_err(|e| ChartError::Config(format!("CANDLESYNC_INTERVAL: {e}")))?,
        None => Interval::default(),
    };

    let style = match non_empty_var("CANDLESYNC_STYLE") {
        Some(raw) => raw
            .parse()
            .map_err(|e| ChartError::Config(format!("CANDLESYNC_STYLE: {e}")))?,
        None => ChartStyle::default(),
    };

    let history_limit = match non_empty_var("CANDLESYNC_HISTORY_LIMIT") {
        Some(raw) => parse_history_limit(&raw)?,
        None => DEFAULT_HISTORY_LIMIT,
    };

    let reconnect = match non_empty_var("CANDLESYNC_RECONNECT") {
        Some(raw) => parse_flag("CANDLESYNC_RECONNECT", &raw)?,
        None => true,
    };

    let rest_url =
        non_empty_var("CANDLESYNC_REST_URL").unwrap_or_else(|| DEFAULT_REST_URL.to_string());
    let stream_url =
        non_empty_var("CANDLESYNC_STREAM_URL").unwrap_or_else(|| DEFAULT_STREAM_URL.to_string());
    let log_file = non_empty_var("CANDLESYNC_LOG_FILE")
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);

    Ok(AppConfig {
        chart: ChartConfig {
            symbol,
            interval,
            style,
            history_limit,
        },
        binance: BinanceConfig {
            rest_url,
            stream_url,
            reconnect,
        },
        log_file,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn parse_symbol(raw: &str) -> crate::Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();
    if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ChartError::Config(format!(
            "CANDLESYNC_SYMBOL must be ASCII alphanumeric, got {raw:?}"
        )));
    }
    Ok(symbol)
}

fn parse_history_limit(raw: &str) -> crate::Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(limit) if (1..=MAX_HISTORY_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ChartError::Config(format!(
            "CANDLESYNC_HISTORY_LIMIT must be between 1 and {MAX_HISTORY_LIMIT}, got {raw:?}"
        ))),
    }
}

fn parse_flag(name: &str, raw: &str) -> crate::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ChartError::Config(format!(
            "{name} must be true/false/1/0, got {raw:?}"
        ))),
    }
}
