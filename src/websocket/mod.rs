//! Live kline feed: subscription lifecycle and message decoding.
//!
//! This module is organized by concern:
//! - [`subscription`] - Subscription handles and the delivery sink
//! - [`connection`] - Binance stream worker with reconnect/backoff
//! - [`handler`] - Incoming message decoding

mod connection;
mod handler;
mod subscription;

use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::info;

use crate::Result;
use crate::models::Interval;

pub use connection::BinanceFeed;
pub use handler::{decode_kline_event, dispatch_frame};
pub use subscription::{FeedSink, SubscriptionHandle};

/// A client WebSocket connection.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens streaming subscriptions scoped to (symbol, interval).
///
/// Implementations deliver every decoded message through `sink.delta` and
/// every undecodable one through `sink.error`, without closing the
/// subscription. At most one subscription per engine is open at a time; the
/// engine enforces that, not the feed.
pub trait LiveFeed {
    fn open(&self, symbol: &str, interval: Interval, sink: FeedSink) -> SubscriptionHandle;
}

/// Establishes a WebSocket connection to the given URL.
///
/// # Errors
///
/// Returns a [`ChartError`](crate::ChartError) if the connection or TLS handshake fails.
pub async fn connect(url: &str) -> Result<WsStream> {
    let (ws_stream, _) = connect_async(url).await?;
    info!(url, "WebSocket handshake completed");

    Ok(ws_stream)
}
