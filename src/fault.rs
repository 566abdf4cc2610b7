//! Observability hook for recovered failures.
//!
//! Snapshot and feed failures never propagate into the engine's control
//! flow. They are handed to a [`FaultReporter`] instead, which by default
//! just logs them.

use tracing::warn;

use crate::ChartError;
use crate::models::Interval;

/// A failure that was recovered locally.
#[derive(Debug)]
pub enum Fault {
    /// History could not be fetched or decoded; an empty series was used.
    SnapshotFetch {
        symbol: String,
        interval: Interval,
        error: ChartError,
    },
    /// A streaming message could not be decoded and was discarded.
    FeedDecode {
        symbol: String,
        interval: Interval,
        error: ChartError,
    },
}

impl Fault {
    pub fn interval(&self) -> Interval {
        match self {
            Fault::SnapshotFetch { interval, .. } | Fault::FeedDecode { interval, .. } => *interval,
        }
    }
}

/// Receives recovered failures.
pub trait FaultReporter: Send + Sync {
    fn report(&self, fault: Fault);
}

/// Default reporter: emits a `warn!` event per fault.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl FaultReporter for TracingReporter {
    fn report(&self, fault: Fault) {
        match fault {
            Fault::SnapshotFetch {
                symbol,
                interval,
                error,
            } => {
                warn!(
                    %symbol,
                    %interval,
                    %error,
                    "Snapshot fetch failed, continuing with empty history"
                );
            }
            Fault::FeedDecode {
                symbol,
                interval,
                error,
            } => {
                warn!(%symbol, %interval, %error, "Discarding undecodable feed message");
            }
        }
    }
}
