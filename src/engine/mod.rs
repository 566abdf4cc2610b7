//! Candle synchronization engine.
//!
//! The engine is a synchronous state machine owned by one task:
//!
//! ```text
//! Idle -> Loading(i) -> Streaming(i) -> Loading(i') -> ... -> Idle
//! ```
//!
//! Async work never touches engine state. Snapshot loads and feed workers
//! report back by sending [`EngineEvent`]s on the channel from [`channel`],
//! and the owner passes each one to [`Engine::handle`]. Every event carries
//! the epoch (for snapshots) or subscription id (for feed traffic) it belongs
//! to, so anything produced for a superseded interval is dropped on arrival.

mod state;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::ChartError;
use crate::fault::{Fault, FaultReporter};
use crate::models::{ChartStyle, DisplayStats, HistorySeries, Interval, LiveDelta};
use crate::series::{SeriesAdapter, Trend};
use crate::snapshot::SnapshotSource;
use crate::websocket::{FeedSink, LiveFeed, SubscriptionHandle};

pub use state::ChartState;

/// Messages from background work back to the engine.
#[derive(Debug)]
pub enum EngineEvent {
    /// A snapshot load finished (possibly with an empty series).
    SnapshotLoaded { epoch: u64, series: HistorySeries },
    /// A feed decoded one kline update.
    Delta { subscription: u64, delta: LiveDelta },
    /// A feed received a message it could not decode.
    FeedError { subscription: u64, error: ChartError },
}

/// Creates the channel background work uses to reach the engine.
pub fn channel() -> (
    mpsc::UnboundedSender<EngineEvent>,
    mpsc::UnboundedReceiver<EngineEvent>,
) {
    mpsc::unbounded_channel()
}

/// User-facing requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectInterval(Interval),
    SelectStyle(ChartStyle),
    Shutdown,
}

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Waiting for the snapshot of this interval.
    Loading(Interval),
    /// History applied and a live subscription is open.
    Streaming(Interval),
}

impl Phase {
    pub fn interval(self) -> Option<Interval> {
        match self {
            Phase::Idle => None,
            Phase::Loading(interval) | Phase::Streaming(interval) => Some(interval),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading(_) => "loading",
            Phase::Streaming(_) => "streaming",
        }
    }
}

/// Static engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub symbol: String,
    /// Maximum number of candles requested per snapshot.
    pub history_limit: u16,
    /// Style in effect before the first `select_style`.
    pub style: ChartStyle,
}

/// Keeps a chart consistent with one symbol's snapshot and live feed.
pub struct Engine<S, F, A> {
    symbol: String,
    history_limit: u16,
    loader: Arc<S>,
    feed: F,
    adapter: A,
    reporter: Arc<dyn FaultReporter>,
    tx: mpsc::UnboundedSender<EngineEvent>,
    epoch: u64,
    phase: Phase,
    style: ChartStyle,
    state: ChartState,
    subscription: Option<SubscriptionHandle>,
}

impl<S, F, A> Engine<S, F, A>
where
    S: SnapshotSource,
    F: LiveFeed,
    A: SeriesAdapter,
{
    /// Creates an idle engine. Events for it must be sent on `tx`.
    pub fn new(
        config: EngineConfig,
        loader: Arc<S>,
        feed: F,
        adapter: A,
        reporter: Arc<dyn FaultReporter>,
        tx: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        Self {
            symbol: config.symbol,
            history_limit: config.history_limit,
            loader,
            feed,
            adapter,
            reporter,
            tx,
            epoch: 0,
            phase: Phase::Idle,
            style: config.style,
            state: ChartState::new(),
            subscription: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Interval currently selected, `None` when idle.
    pub fn interval(&self) -> Option<Interval> {
        self.phase.interval()
    }

    pub fn style(&self) -> ChartStyle {
        self.style
    }

    pub fn history(&self) -> &HistorySeries {
        self.state.history()
    }

    pub fn stats(&self) -> Option<&DisplayStats> {
        self.state.stats()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Id of the open subscription, if any.
    pub fn subscription_id(&self) -> Option<u64> {
        self.subscription.as_ref().map(SubscriptionHandle::id)
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Switches to `interval`: drops the current subscription, then loads
    /// history. The new subscription opens once history is applied.
    ///
    /// Must be called from within a Tokio runtime when `interval` has a
    /// snapshot, since the load runs as a spawned task.
    pub fn select_interval(&mut self, interval: Interval) {
        self.epoch += 1;
        self.close_subscription();
        self.phase = Phase::Loading(interval);
        info!(epoch = self.epoch, %interval, symbol = %self.symbol, "Interval selected");

        if !interval.has_snapshot() {
            self.apply_snapshot(self.epoch, HistorySeries::new());
            return;
        }

        let loader = Arc::clone(&self.loader);
        let tx = self.tx.clone();
        let symbol = self.symbol.clone();
        let epoch = self.epoch;
        let limit = self.history_limit;
        tokio::spawn(async move {
            let series = loader.load(&symbol, interval, limit).await;
            // The engine may be gone already; nothing to deliver to.
            let _ = tx.send(EngineEvent::SnapshotLoaded { epoch, series });
        });
    }

    /// Changes the chart style without reloading or resubscribing.
    pub fn select_style(&mut self, style: ChartStyle) {
        self.style = style;
        info!(%style, phase = self.phase.label(), "Style selected");

        if let Phase::Streaming(_) = self.phase {
            self.adapter.full_redraw(self.state.history(), style);
            let stats = self.state.stats().copied();
            self.adapter.update_stats(stats.as_ref());
            if let Some(stats) = stats {
                self.adapter.set_price_marker(
                    stats.close,
                    Trend::from_stats(&stats),
                    &stats.marker_label(),
                );
            }
        }
    }

    /// Stops everything and returns to `Idle`. Calling it again is a no-op.
    pub fn teardown(&mut self) {
        if self.phase == Phase::Idle && self.subscription.is_none() {
            return;
        }

        self.epoch += 1;
        self.close_subscription();
        self.state.clear();
        self.adapter.clear_price_marker();
        self.adapter.update_stats(None);
        self.phase = Phase::Idle;
        info!(epoch = self.epoch, "Engine torn down");
    }

    /// [`teardown`](Self::teardown), then waits for the closed feed worker
    /// to finish.
    pub async fn shutdown(&mut self) {
        let subscription = self.subscription.take();
        self.teardown();
        if let Some(handle) = subscription {
            handle.shutdown().await;
        }
    }

    /// Applies one background event.
    pub fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::SnapshotLoaded { epoch, series } => self.apply_snapshot(epoch, series),
            EngineEvent::Delta {
                subscription,
                delta,
            } => {
                if self.accepts(subscription) {
                    self.apply_delta(&delta);
                } else {
                    debug!(subscription, "Dropping delta from inactive subscription");
                }
            }
            EngineEvent::FeedError {
                subscription,
                error,
            } => {
                if !self.accepts(subscription) {
                    debug!(subscription, "Dropping error from inactive subscription");
                    return;
                }
                if let Phase::Streaming(interval) = self.phase {
                    self.reporter.report(Fault::FeedDecode {
                        symbol: self.symbol.clone(),
                        interval,
                        error,
                    });
                }
            }
        }
    }

    /// Applies one user command.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SelectInterval(interval) => self.select_interval(interval),
            Command::SelectStyle(style) => self.select_style(style),
            Command::Shutdown => self.teardown(),
        }
    }

    /// Drives the engine until [`Command::Shutdown`] or until the command
    /// channel closes, then shuts down and hands the adapter back.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut events: mpsc::UnboundedReceiver<EngineEvent>,
    ) -> A {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                Some(event) = events.recv() => self.handle(event),
            }
        }

        self.shutdown().await;
        self.adapter
    }

    fn accepts(&self, subscription: u64) -> bool {
        matches!(self.phase, Phase::Streaming(_)) && self.subscription_id() == Some(subscription)
    }

    fn apply_snapshot(&mut self, epoch: u64, series: HistorySeries) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "Dropping stale snapshot");
            return;
        }
        let Phase::Loading(interval) = self.phase else {
            debug!(epoch, phase = self.phase.label(), "Snapshot arrived outside loading");
            return;
        };

        let stats = self.state.seed(interval, series, now_ms());
        self.adapter.clear_price_marker();
        self.adapter.update_stats(stats.as_ref());
        self.adapter.full_redraw(self.state.history(), self.style);
        info!(
            epoch,
            %interval,
            candles = self.state.history().len(),
            "Snapshot applied"
        );

        let sink = FeedSink::new(self.epoch, self.tx.clone());
        self.subscription = Some(self.feed.open(&self.symbol, interval, sink));
        self.phase = Phase::Streaming(interval);
    }

    fn apply_delta(&mut self, delta: &LiveDelta) {
        let Some((candle, stats, outcome)) = self.state.merge(delta) else {
            return;
        };
        debug!(
            open_time = candle.open_time,
            close = %candle.close,
            ?outcome,
            "Delta merged"
        );

        self.adapter.incremental_update(&candle, self.style);
        self.adapter.update_stats(Some(&stats));
        self.adapter.set_price_marker(
            stats.close,
            Trend::from_stats(&stats),
            &stats.marker_label(),
        );
    }

    fn close_subscription(&mut self) {
        if let Some(mut handle) = self.subscription.take() {
            handle.close();
        }
    }
}

/// Wall-clock time in milliseconds, used to seed the countdown before the
/// first delta arrives.
fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
