//! Subscription handles and the callback sink handed to feed workers.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::ChartError;
use crate::engine::EngineEvent;
use crate::models::{Interval, LiveDelta};

/// Delivery side of a subscription: the `onDelta` / `onError` callbacks.
///
/// Every event is tagged with the subscription id so the engine can drop
/// anything sent by a handle it no longer considers active.
#[derive(Debug, Clone)]
pub struct FeedSink {
    subscription: u64,
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl FeedSink {
    pub fn new(subscription: u64, tx: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self { subscription, tx }
    }

    pub fn subscription(&self) -> u64 {
        self.subscription
    }

    /// Delivers a decoded delta. Returns `false` once the engine is gone.
    pub fn delta(&self, delta: LiveDelta) -> bool {
        self.tx
            .send(EngineEvent::Delta {
                subscription: self.subscription,
                delta,
            })
            .is_ok()
    }

    /// Reports a message that could not be decoded. Returns `false` once the
    /// engine is gone.
    pub fn error(&self, error: ChartError) -> bool {
        self.tx
            .send(EngineEvent::FeedError {
                subscription: self.subscription,
                error,
            })
            .is_ok()
    }
}

/// How long [`SubscriptionHandle::shutdown`] waits for the worker.
const WORKER_STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// One live feed connection scoped to (symbol, interval).
///
/// Closing signals the worker to shut its connection down. `close` is
/// idempotent and also runs on drop.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
    symbol: String,
    interval: Interval,
    shutdown: Option<oneshot::Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn new(
        id: u64,
        symbol: impl Into<String>,
        interval: Interval,
        shutdown: oneshot::Sender<()>,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            interval,
            shutdown: Some(shutdown),
            worker: None,
        }
    }

    /// Attaches the task serving this subscription, so
    /// [`shutdown`](Self::shutdown) can wait for it.
    pub fn with_worker(mut self, worker: JoinHandle<()>) -> Self {
        self.worker = Some(worker);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn is_open(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Closes the subscription. Returns `true` only for the call that
    /// actually closed it; later calls are no-ops.
    pub fn close(&mut self) -> bool {
        match self.shutdown.take() {
            Some(shutdown) => {
                // The worker may already have exited on its own.
                let _ = shutdown.send(());
                info!(
                    subscription = self.id,
                    symbol = %self.symbol,
                    interval = %self.interval,
                    "Closed subscription"
                );
                true
            }
            None => false,
        }
    }

    /// Closes the subscription and waits for its worker to send the close
    /// frame and exit.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(worker) = self.worker.take()
            && tokio::time::timeout(WORKER_STOP_TIMEOUT, worker).await.is_err()
        {
            warn!(subscription = self.id, "Feed worker did not stop in time");
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
