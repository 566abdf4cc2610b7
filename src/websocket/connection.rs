//! Kline stream connection lifecycle.
//!
//! [`BinanceFeed`] opens one worker task per subscription. The worker
//! connects, forwards frames to the handler, and reconnects with exponential
//! backoff when the connection drops, until its handle is closed.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::handler::dispatch_frame;
use super::{FeedSink, LiveFeed, SubscriptionHandle, WsStream, connect};
use crate::models::Interval;

/// Initial backoff duration between reconnection attempts.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff duration between reconnection attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Reconnect delay: starts at [`INITIAL_BACKOFF`] and doubles up to
/// [`MAX_BACKOFF`].
#[derive(Debug)]
struct Backoff {
    current: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            current: INITIAL_BACKOFF,
        }
    }

    /// Delay to wait now. The following one is doubled.
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (delay * 2).min(MAX_BACKOFF);
        delay
    }

    fn reset(&mut self) {
        self.current = INITIAL_BACKOFF;
    }
}

/// Why the reader loop exited.
#[derive(Debug, PartialEq, Eq)]
enum DisconnectReason {
    /// The connection was lost or errored.
    ConnectionError,
    /// The handle was closed or the engine went away.
    Shutdown,
}

/// Live feed backed by the Binance `<symbol>@kline_<interval>` streams.
#[derive(Debug, Clone)]
pub struct BinanceFeed {
    base_url: String,
    reconnect: bool,
}

impl BinanceFeed {
    /// Creates a feed for the stream host rooted at `base_url`
    /// (e.g. `wss://stream.binance.com:9443/ws`).
    pub fn new(base_url: impl Into<String>, reconnect: bool) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reconnect,
        }
    }
}

impl LiveFeed for BinanceFeed {
    fn open(&self, symbol: &str, interval: Interval, sink: FeedSink) -> SubscriptionHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let id = sink.subscription();
        let worker = StreamWorker {
            url: stream_endpoint(&self.base_url, symbol, interval),
            reconnect: self.reconnect,
            sink,
        };
        let worker = tokio::spawn(worker.run(shutdown_rx));

        info!(subscription = id, symbol, %interval, "Opened subscription");
        SubscriptionHandle::new(id, symbol, interval, shutdown_tx).with_worker(worker)
    }
}

/// Background task owning one stream connection.
struct StreamWorker {
    url: String,
    reconnect: bool,
    sink: FeedSink,
}

impl StreamWorker {
    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        let mut backoff = Backoff::new();

        loop {
            info!(url = %self.url, "Connecting to kline stream");
            let connected = tokio::select! {
                result = connect(&self.url) => result,
                _ = &mut shutdown => return,
            };

            match connected {
                Ok(stream) => {
                    // Reset backoff on successful connection
                    backoff.reset();
                    if self.read_loop(stream, &mut shutdown).await == DisconnectReason::Shutdown {
                        info!(url = %self.url, "Kline stream worker shutting down");
                        return;
                    }
                }
                Err(e) => error!(url = %self.url, "Connection failed: {e}"),
            }

            if !self.reconnect {
                warn!(url = %self.url, "Kline stream lost, reconnect disabled");
                return;
            }

            let delay = backoff.next_delay();
            info!(backoff_secs = delay.as_secs(), "Backing off before reconnect");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => return,
            }
        }
    }

    /// Reads frames until disconnection or shutdown.
    async fn read_loop(
        &self,
        mut stream: WsStream,
        shutdown: &mut oneshot::Receiver<()>,
    ) -> DisconnectReason {
        loop {
            tokio::select! {
                _ = &mut *shutdown => {
                    let _ = stream.close(None).await;
                    return DisconnectReason::Shutdown;
                }
                frame = stream.next() => {
                    match frame {
                        Some(Ok(frame)) => {
                            if !dispatch_frame(frame, &self.sink) {
                                return DisconnectReason::Shutdown;
                            }
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error: {e}");
                            return DisconnectReason::ConnectionError;
                        }
                        None => {
                            warn!("WebSocket stream ended");
                            return DisconnectReason::ConnectionError;
                        }
                    }
                }
            }
        }
    }
}

fn stream_endpoint(base_url: &str, symbol: &str, interval: Interval) -> String {
    format!(
        "{base_url}/{}@kline_{}",
        symbol.to_ascii_lowercase(),
        interval.as_str()
    )
}
