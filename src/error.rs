//! Crate-level error types.
//!
//! [`ChartError`] unifies every error source (configuration, HTTP,
//! WebSocket, JSON) behind a single enum so callers can match on the
//! variant they care about while still using the `?` operator for easy
//! propagation.
//!
//! None of these are fatal to the synchronization engine: snapshot and
//! feed failures are recovered locally and surfaced through
//! [`FaultReporter`](crate::fault::FaultReporter) instead of being returned.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChartError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    /// An environment variable held a value that could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// A WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// An HTTP request failed or returned a non-success status.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A payload was valid JSON but did not have the expected shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// An interval, style or other token was not recognised.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Terminal I/O failed.
    #[error("io error: {0}")]
    Io(String),
}
