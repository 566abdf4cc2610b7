//! Historical candle snapshot loading.
//!
//! [`SnapshotSource`] is the contract the engine depends on; [`BinanceSnapshot`]
//! implements it against the public `klines` REST endpoint. Loading never
//! fails from the caller's point of view: any transport or decode problem is
//! reported as a [`Fault::SnapshotFetch`] and an empty series is returned.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::Result;
use crate::fault::{Fault, FaultReporter};
use crate::models::kline::candles_from_payload;
use crate::models::{Candle, HistorySeries, Interval};

/// Upper bound for a single snapshot request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a bounded, ascending candle series for one interval.
pub trait SnapshotSource: Send + Sync + 'static {
    /// Loads at most `limit` candles. An empty series means "no history
    /// available yet", never a fatal condition.
    fn load(
        &self,
        symbol: &str,
        interval: Interval,
        limit: u16,
    ) -> impl Future<Output = HistorySeries> + Send;
}

/// Snapshot loader backed by the Binance `GET /klines` endpoint.
pub struct BinanceSnapshot {
    client: reqwest::Client,
    base_url: String,
    reporter: Arc<dyn FaultReporter>,
}

impl BinanceSnapshot {
    /// Creates a loader for the REST API rooted at `base_url`
    /// (e.g. `https://api.binance.com/api/v3`).
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Http`](crate::ChartError::Http) if the HTTP
    /// client cannot be built.
    pub fn new(base_url: impl Into<String>, reporter: Arc<dyn FaultReporter>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reporter,
        })
    }

    async fn fetch(&self, symbol: &str, interval: Interval, limit: u16) -> Result<Vec<Candle>> {
        let endpoint = klines_endpoint(&self.base_url, symbol, interval, limit);
        debug!(%endpoint, "Requesting kline snapshot");
        let response = self.client.get(endpoint).send().await?.error_for_status()?;
        let payload: serde_json::Value = response.json().await?;
        candles_from_payload(payload)
    }
}

impl SnapshotSource for BinanceSnapshot {
    async fn load(&self, symbol: &str, interval: Interval, limit: u16) -> HistorySeries {
        if !interval.has_snapshot() {
            debug!(%interval, "Interval is stream-only, skipping snapshot");
            return HistorySeries::new();
        }

        match self.fetch(symbol, interval, limit).await {
            Ok(candles) => {
                let series = HistorySeries::from_candles(candles);
                info!(symbol, %interval, candles = series.len(), "Loaded kline snapshot");
                series
            }
            Err(error) => {
                self.reporter.report(Fault::SnapshotFetch {
                    symbol: symbol.to_string(),
                    interval,
                    error,
                });
                HistorySeries::new()
            }
        }
    }
}

fn klines_endpoint(base_url: &str, symbol: &str, interval: Interval, limit: u16) -> String {
    format!(
        "{base_url}/klines?symbol={}&interval={}&limit={limit}",
        symbol.to_ascii_uppercase(),
        interval.as_str()
    )
}
