//! Application state for the TUI.

use std::time::Instant;

use rust_decimal::Decimal;

use crate::engine::Phase;
use crate::models::{Candle, ChartStyle, DisplayStats, HistorySeries, Interval, MAX_SERIES_LEN};
use crate::series::{SeriesAdapter, SeriesPoint, Trend, to_points};

/// Top-level UI state that is not owned by the engine.
#[derive(Debug)]
pub struct App {
    pub symbol: String,
    /// Interval last reported by the engine (or requested at startup).
    pub interval: Interval,
    pub style: ChartStyle,
    pub phase: Phase,
    /// Whether the application should exit.
    pub should_quit: bool,
}

impl App {
    pub fn new(symbol: impl Into<String>, interval: Interval, style: ChartStyle) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            style,
            phase: Phase::Idle,
            should_quit: false,
        }
    }

    /// Mirrors the engine's public state after it processed something.
    pub fn observe(&mut self, phase: Phase, style: ChartStyle) {
        if let Some(interval) = phase.interval() {
            self.interval = interval;
        }
        self.phase = phase;
        self.style = style;
    }
}

/// Current live price marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceMarker {
    pub price: Decimal,
    pub trend: Trend,
    pub label: String,
}

/// Render-ready chart contents, fed by the engine through [`SeriesAdapter`].
#[derive(Debug, Default)]
pub struct ChartView {
    points: Vec<SeriesPoint>,
    style: ChartStyle,
    marker: Option<PriceMarker>,
    stats: Option<DisplayStats>,
    stats_at: Option<Instant>,
    redraws: u64,
}

impl ChartView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn style(&self) -> ChartStyle {
        self.style
    }

    pub fn marker(&self) -> Option<&PriceMarker> {
        self.marker.as_ref()
    }

    pub fn stats(&self) -> Option<&DisplayStats> {
        self.stats.as_ref()
    }

    /// Number of full redraws received so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Countdown adjusted for time elapsed since the stats arrived, so the
    /// status bar keeps ticking between deltas.
    pub fn live_remaining_ms(&self) -> Option<i64> {
        let stats = self.stats?;
        let elapsed = self
            .stats_at
            .map(|at| i64::try_from(at.elapsed().as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Some(stats.remaining_ms.saturating_sub(elapsed).max(0))
    }
}

impl SeriesAdapter for ChartView {
    fn full_redraw(&mut self, series: &HistorySeries, style: ChartStyle) {
        self.points = to_points(series, style);
        self.style = style;
        self.redraws += 1;
    }

    fn incremental_update(&mut self, candle: &Candle, style: ChartStyle) {
        let point = SeriesPoint::from_candle(candle, style);
        match self.points.last_mut() {
            Some(last) if last.time() == point.time() => *last = point,
            _ => {
                self.points.push(point);
                let excess = self.points.len().saturating_sub(MAX_SERIES_LEN);
                self.points.drain(..excess);
            }
        }
    }

    fn set_price_marker(&mut self, price: Decimal, trend: Trend, label: &str) {
        self.marker = Some(PriceMarker {
            price,
            trend,
            label: label.to_string(),
        });
    }

    fn clear_price_marker(&mut self) {
        self.marker = None;
    }

    fn update_stats(&mut self, stats: Option<&DisplayStats>) {
        self.stats = stats.copied();
        self.stats_at = stats.map(|_| Instant::now());
    }
}
