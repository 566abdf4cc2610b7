//! Live OHLC candle chart synchronization.
//!
//! Keeps a chart consistent with a market data source that offers a one-shot
//! historical snapshot (REST `klines`) plus an incremental stream of kline
//! updates, across user-driven interval and style changes.
//!
//! The [`engine::Engine`] owns all chart state. It talks to a
//! [`snapshot::SnapshotSource`], a [`websocket::LiveFeed`] and a
//! [`series::SeriesAdapter`]; Binance and terminal implementations of each
//! ship with the crate.

pub mod config;
pub mod engine;
pub mod error;
pub mod fault;
pub mod models;
pub mod series;
pub mod snapshot;
pub mod tui;
pub mod websocket;

pub use error::{ChartError, Result};
