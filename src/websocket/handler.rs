//! Incoming kline stream message processing.

use tracing::debug;
use tungstenite::Message;

use super::FeedSink;
use crate::Result;
use crate::models::LiveDelta;
use crate::models::kline::KlineEvent;

/// Decodes one kline stream text message into a [`LiveDelta`].
///
/// # Errors
///
/// Returns [`ChartError::Json`](crate::ChartError::Json) if the payload is
/// not a kline envelope, or
/// [`ChartError::MalformedMessage`](crate::ChartError::MalformedMessage) if a
/// price is negative.
pub fn decode_kline_event(text: &str) -> Result<LiveDelta> {
    let event: KlineEvent = serde_json::from_str(text)?;
    event.try_into()
}

/// Routes a WebSocket frame to the sink.
///
/// Text frames are decoded; decode failures go to `sink.error` and the
/// connection stays up. Other frames are ignored. Returns `false` when the
/// receiving engine has gone away.
pub fn dispatch_frame(frame: Message, sink: &FeedSink) -> bool {
    match frame {
        Message::Text(text) => match decode_kline_event(text.as_str()) {
            Ok(delta) => sink.delta(delta),
            Err(error) => sink.error(error),
        },
        Message::Close(frame) => {
            debug!(?frame, "Received close frame");
            true
        }
        _ => true, // Binary/Ping/Pong frames
    }
}
