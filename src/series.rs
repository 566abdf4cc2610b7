//! Rendering contract between the engine and whatever draws the chart.
//!
//! The engine guarantees an adapter never receives `incremental_update`
//! before at least one `full_redraw` for the current interval, and never sees
//! calls for two intervals without a `full_redraw` in between.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::models::{Candle, ChartStyle, DisplayStats, HistorySeries};

/// Direction of a candle, used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Up when the candle closed at or above its open.
    pub fn from_candle(candle: &Candle) -> Self {
        if candle.is_up() { Trend::Up } else { Trend::Down }
    }

    pub fn from_stats(stats: &DisplayStats) -> Self {
        if stats.is_up { Trend::Up } else { Trend::Down }
    }
}

/// Receives render instructions from the engine.
pub trait SeriesAdapter {
    /// Replaces everything drawn with `series` in `style`.
    fn full_redraw(&mut self, series: &HistorySeries, style: ChartStyle);

    /// Updates or appends the point for `candle.open_time`.
    fn incremental_update(&mut self, candle: &Candle, style: ChartStyle);

    fn set_price_marker(&mut self, price: Decimal, trend: Trend, label: &str);

    fn clear_price_marker(&mut self);

    /// Stats for the in-progress candle, `None` when there is no candle yet.
    fn update_stats(&mut self, _stats: Option<&DisplayStats>) {}
}

/// One render-ready point in a given style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesPoint {
    /// Candlestick and bar styles.
    Ohlc {
        time: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        trend: Trend,
    },
    /// Line and area styles.
    Value { time: i64, value: Decimal },
}

impl SeriesPoint {
    pub fn from_candle(candle: &Candle, style: ChartStyle) -> Self {
        if style.uses_ohlc() {
            SeriesPoint::Ohlc {
                time: candle.open_time,
                open: candle.open,
                high: candle.high,
                low: candle.low,
                close: candle.close,
                trend: Trend::from_candle(candle),
            }
        } else {
            SeriesPoint::Value {
                time: candle.open_time,
                value: candle.value(),
            }
        }
    }

    pub fn time(&self) -> i64 {
        match self {
            SeriesPoint::Ohlc { time, .. } | SeriesPoint::Value { time, .. } => *time,
        }
    }

    /// Closing value of the point, whatever the style.
    pub fn close(&self) -> Decimal {
        match self {
            SeriesPoint::Ohlc { close, .. } => *close,
            SeriesPoint::Value { value, .. } => *value,
        }
    }

    pub fn low(&self) -> Decimal {
        match self {
            SeriesPoint::Ohlc { low, .. } => *low,
            SeriesPoint::Value { value, .. } => *value,
        }
    }

    pub fn high(&self) -> Decimal {
        match self {
            SeriesPoint::Ohlc { high, .. } => *high,
            SeriesPoint::Value { value, .. } => *value,
        }
    }
}

/// Translates a whole series into points for `style`.
pub fn to_points(series: &HistorySeries, style: ChartStyle) -> Vec<SeriesPoint> {
    series
        .iter()
        .map(|candle| SeriesPoint::from_candle(candle, style))
        .collect()
}

/// Adapter that only logs, for headless runs.
#[derive(Debug, Default)]
pub struct TracingAdapter {
    redraws: usize,
    updates: usize,
}

impl TracingAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redraws(&self) -> usize {
        self.redraws
    }

    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl SeriesAdapter for TracingAdapter {
    fn full_redraw(&mut self, series: &HistorySeries, style: ChartStyle) {
        self.redraws += 1;
        info!(
            %style,
            candles = series.len(),
            last_close = ?series.last().map(|c| c.close),
            "Full redraw"
        );
    }

    fn incremental_update(&mut self, candle: &Candle, style: ChartStyle) {
        self.updates += 1;
        debug!(%style, open_time = candle.open_time, close = %candle.close, "Incremental update");
    }

    fn set_price_marker(&mut self, price: Decimal, trend: Trend, label: &str) {
        debug!(%price, ?trend, label, "Price marker");
    }

    fn clear_price_marker(&mut self) {
        debug!("Price marker cleared");
    }

    fn update_stats(&mut self, stats: Option<&DisplayStats>) {
        if let Some(stats) = stats {
            debug!(
                change = %stats.change,
                percent = %stats.percent.round_dp(2),
                countdown = %stats.countdown(),
                "Stats"
            );
        }
    }
}
