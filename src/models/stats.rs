//! Rolling display statistics derived from the current candle.

use rust_decimal::Decimal;

use super::candle::Candle;
use super::interval::Interval;

/// Render-ready statistics for the in-progress candle.
///
/// Has no identity of its own: it is recomputed from (candle, interval,
/// event time) on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayStats {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// `close - open`.
    pub change: Decimal,
    /// `change / open * 100`, or zero when `open` is zero.
    pub percent: Decimal,
    pub is_up: bool,
    /// Milliseconds until the candle's interval boundary, never negative.
    pub remaining_ms: i64,
}

impl DisplayStats {
    /// Computes the statistics for `candle` as seen at `event_time_ms`.
    pub fn compute(candle: &Candle, interval: Interval, event_time_ms: i64) -> Self {
        let change = candle.close - candle.open;
        let percent = if candle.open.is_zero() {
            Decimal::ZERO
        } else {
            change
                .checked_div(candle.open)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        };

        Self {
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            change,
            percent,
            is_up: candle.close >= candle.open,
            remaining_ms: remaining_ms(candle.open_time, interval, event_time_ms),
        }
    }

    /// Countdown text for the remaining time, see [`format_remaining`].
    pub fn countdown(&self) -> String {
        format_remaining(self.remaining_ms)
    }

    /// Label shown next to the live price marker, e.g. `"105.00 | 00:42"`.
    pub fn marker_label(&self) -> String {
        format!("{:.2} | {}", self.close, self.countdown())
    }
}

/// Time left until the bucket that opened at `open_time_secs` closes,
/// clamped at zero.
pub fn remaining_ms(open_time_secs: i64, interval: Interval, event_time_ms: i64) -> i64 {
    open_time_secs
        .saturating_add(interval.duration_secs())
        .saturating_mul(1_000)
        .saturating_sub(event_time_ms)
        .max(0)
}

/// Formats milliseconds as `mm:ss`. Minutes are not wrapped into hours.
pub fn format_remaining(ms: i64) -> String {
    if ms <= 0 {
        return "00:00".to_string();
    }
    let total_secs = ms / 1_000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
