//! Shared test utilities: in-memory collaborators for the engine.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use candlesync::engine::{self, Engine, EngineConfig, EngineEvent};
use candlesync::fault::{Fault, FaultReporter};
use candlesync::models::{Candle, ChartStyle, DisplayStats, HistorySeries, Interval, LiveDelta};
use candlesync::series::{SeriesAdapter, Trend};
use candlesync::snapshot::SnapshotSource;
use candlesync::websocket::{FeedSink, LiveFeed, SubscriptionHandle};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::{mpsc, oneshot};

pub const SYMBOL: &str = "BTCUSDT";

/// Open time (seconds) of the last candle in [`history`] for `1m`.
pub const LAST_OPEN: i64 = 1_700_017_920;

/// `count` one-minute candles ending at `LAST_OPEN`.
pub fn history(count: i64) -> HistorySeries {
    series_ending_at(LAST_OPEN, count, 60)
}

pub fn series_ending_at(last_open: i64, count: i64, step: i64) -> HistorySeries {
    HistorySeries::from_candles(
        (0..count)
            .map(|i| candle(last_open - (count - 1 - i) * step, dec!(100)))
            .collect(),
    )
}

pub fn candle(open_time: i64, close: Decimal) -> Candle {
    Candle {
        open_time,
        open: dec!(100),
        high: close.max(dec!(100)),
        low: close.min(dec!(100)),
        close,
    }
}

/// A delta for the candle at `open_time`, observed `after_ms` into it.
pub fn delta(open_time: i64, close: Decimal, after_ms: i64) -> LiveDelta {
    LiveDelta {
        open_time,
        open: dec!(100),
        high: close.max(dec!(100)),
        low: close.min(dec!(100)),
        close,
        event_time: open_time * 1_000 + after_ms,
    }
}

/// Snapshot source serving canned series and recording every request.
#[derive(Default)]
pub struct FakeSnapshot {
    series: HashMap<Interval, HistorySeries>,
    calls: Mutex<Vec<Interval>>,
}

impl FakeSnapshot {
    pub fn with(mut self, interval: Interval, series: HistorySeries) -> Self {
        self.series.insert(interval, series);
        self
    }

    pub fn calls(&self) -> Vec<Interval> {
        self.calls.lock().unwrap().clone()
    }
}

impl SnapshotSource for FakeSnapshot {
    async fn load(&self, _symbol: &str, interval: Interval, limit: u16) -> HistorySeries {
        self.calls.lock().unwrap().push(interval);
        let mut candles: Vec<Candle> = self
            .series
            .get(&interval)
            .map(|s| s.as_slice().to_vec())
            .unwrap_or_default();
        let excess = candles.len().saturating_sub(usize::from(limit));
        candles.drain(..excess);
        HistorySeries::from_candles(candles)
    }
}

/// One subscription opened on a [`FakeFeed`].
pub struct Opened {
    pub interval: Interval,
    pub sink: FeedSink,
    shutdown: oneshot::Receiver<()>,
}

/// Live feed that hands its sinks to the test instead of connecting.
#[derive(Clone, Default)]
pub struct FakeFeed {
    opened: Arc<Mutex<Vec<Opened>>>,
}

impl FakeFeed {
    pub fn opened(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub fn interval(&self, index: usize) -> Interval {
        self.opened.lock().unwrap()[index].interval
    }

    pub fn sink(&self, index: usize) -> FeedSink {
        self.opened.lock().unwrap()[index].sink.clone()
    }

    /// Whether the handle for subscription `index` has been closed.
    pub fn is_closed(&self, index: usize) -> bool {
        let mut opened = self.opened.lock().unwrap();
        let shutdown = &mut opened[index].shutdown;
        !matches!(shutdown.try_recv(), Err(oneshot::error::TryRecvError::Empty))
    }
}

impl LiveFeed for FakeFeed {
    fn open(&self, symbol: &str, interval: Interval, sink: FeedSink) -> SubscriptionHandle {
        let (tx, rx) = oneshot::channel();
        let id = sink.subscription();
        self.opened.lock().unwrap().push(Opened {
            interval,
            sink,
            shutdown: rx,
        });
        SubscriptionHandle::new(id, symbol, interval, tx)
    }
}

/// One adapter call, as observed by [`RecordingAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FullRedraw {
        len: usize,
        style: ChartStyle,
        last: Option<Candle>,
    },
    Incremental {
        candle: Candle,
        style: ChartStyle,
    },
    SetMarker {
        price: Decimal,
        trend: Trend,
        label: String,
    },
    ClearMarker,
    Stats(Option<DisplayStats>),
}

#[derive(Debug, Default)]
pub struct RecordingAdapter {
    pub calls: Vec<Call>,
}

impl RecordingAdapter {
    pub fn full_redraws(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::FullRedraw { .. }))
            .collect()
    }

    pub fn incremental_updates(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Incremental { .. }))
            .count()
    }
}

impl SeriesAdapter for RecordingAdapter {
    fn full_redraw(&mut self, series: &HistorySeries, style: ChartStyle) {
        self.calls.push(Call::FullRedraw {
            len: series.len(),
            style,
            last: series.last().copied(),
        });
    }

    fn incremental_update(&mut self, candle: &Candle, style: ChartStyle) {
        self.calls.push(Call::Incremental {
            candle: *candle,
            style,
        });
    }

    fn set_price_marker(&mut self, price: Decimal, trend: Trend, label: &str) {
        self.calls.push(Call::SetMarker {
            price,
            trend,
            label: label.to_string(),
        });
    }

    fn clear_price_marker(&mut self) {
        self.calls.push(Call::ClearMarker);
    }

    fn update_stats(&mut self, stats: Option<&DisplayStats>) {
        self.calls.push(Call::Stats(stats.copied()));
    }
}

/// Records (kind, interval) for every fault.
#[derive(Default)]
pub struct RecordingReporter {
    faults: Mutex<Vec<(&'static str, Interval)>>,
}

impl RecordingReporter {
    pub fn faults(&self) -> Vec<(&'static str, Interval)> {
        self.faults.lock().unwrap().clone()
    }
}

impl FaultReporter for RecordingReporter {
    fn report(&self, fault: Fault) {
        let kind = match fault {
            Fault::SnapshotFetch { .. } => "snapshot",
            Fault::FeedDecode { .. } => "decode",
        };
        self.faults.lock().unwrap().push((kind, fault.interval()));
    }
}

pub type TestEngine = Engine<FakeSnapshot, FakeFeed, RecordingAdapter>;

/// An engine wired to fakes, plus handles on every fake.
pub struct Harness {
    pub engine: TestEngine,
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
    pub loader: Arc<FakeSnapshot>,
    pub feed: FakeFeed,
    pub reporter: Arc<RecordingReporter>,
}

impl Harness {
    pub fn new(loader: FakeSnapshot) -> Self {
        let (tx, events) = engine::channel();
        let loader = Arc::new(loader);
        let feed = FakeFeed::default();
        let reporter = Arc::new(RecordingReporter::default());
        let engine = Engine::new(
            EngineConfig {
                symbol: SYMBOL.to_string(),
                history_limit: 300,
                style: ChartStyle::Candlestick,
            },
            Arc::clone(&loader),
            feed.clone(),
            RecordingAdapter::default(),
            reporter.clone(),
            tx,
        );

        Self {
            engine,
            events,
            loader,
            feed,
            reporter,
        }
    }

    /// Waits for the next background event.
    pub async fn next_event(&mut self) -> EngineEvent {
        tokio::time::timeout(Duration::from_secs(2), self.events.recv())
            .await
            .expect("timed out waiting for engine event")
            .expect("engine channel closed")
    }

    /// Receives one event and feeds it to the engine.
    pub async fn pump(&mut self) {
        let event = self.next_event().await;
        self.engine.handle(event);
    }

    pub fn calls(&self) -> &[Call] {
        &self.engine.adapter().calls
    }

    pub fn clear_calls(&mut self) {
        self.engine.adapter_mut().calls.clear();
    }

    /// Asserts nothing is waiting on the event channel.
    pub fn assert_no_pending_events(&mut self) {
        assert!(self.events.try_recv().is_err(), "unexpected pending event");
    }
}
