//! Canonical candle types held by the synchronization engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLC bar.
///
/// `open_time` is in seconds, the canonical time-axis unit. Prices are
/// stored exactly as the exchange reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Candle {
    /// The single value used by non-OHLC styles.
    pub fn value(&self) -> Decimal {
        self.close
    }

    /// `true` when the candle closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

impl From<&LiveDelta> for Candle {
    fn from(delta: &LiveDelta) -> Self {
        Self {
            open_time: delta.open_time,
            open: delta.open,
            high: delta.high,
            low: delta.low,
            close: delta.close,
        }
    }
}

/// A streaming update for the in-progress (or a newly opened) candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveDelta {
    /// Open time of the candle this delta updates, in seconds.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Server timestamp of the update in milliseconds. Only used for the
    /// countdown, never for ordering.
    pub event_time: i64,
}

/// Outcome of merging one candle into a [`HistorySeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// The last candle was replaced in place (or the series was empty and
    /// now holds exactly this candle).
    Replaced,
    /// A new candle was appended; the previous last candle is now closed.
    Appended,
    /// The candle is older than the last known one and was discarded.
    Stale,
}

/// Longest series kept in memory. Older candles are dropped from the front
/// once a long-running stream pushes past it.
pub const MAX_SERIES_LEN: usize = 2_000;

/// Ordered candles for one interval: strictly increasing `open_time`,
/// no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySeries {
    candles: Vec<Candle>,
}

impl HistorySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from candles in any order. Duplicated timestamps keep
    /// their first occurrence. Only the newest [`MAX_SERIES_LEN`] are kept.
    pub fn from_candles(mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.open_time);
        candles.dedup_by_key(|c| c.open_time);
        let mut series = Self { candles };
        series.trim_front();
        series
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.candles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    /// Merges a streamed candle.
    ///
    /// Same `open_time` as the last candle (or an empty series) replaces in
    /// place, a later `open_time` appends, an earlier one is discarded.
    /// Appending past [`MAX_SERIES_LEN`] drops the oldest candle.
    pub fn merge(&mut self, candle: Candle) -> Merge {
        match self.candles.last_mut() {
            None => {
                self.candles.push(candle);
                Merge::Replaced
            }
            Some(last) if candle.open_time == last.open_time => {
                *last = candle;
                Merge::Replaced
            }
            Some(last) if candle.open_time > last.open_time => {
                self.candles.push(candle);
                self.trim_front();
                Merge::Appended
            }
            Some(_) => Merge::Stale,
        }
    }

    fn trim_front(&mut self) {
        let excess = self.candles.len().saturating_sub(MAX_SERIES_LEN);
        self.candles.drain(..excess);
    }
}

impl<'a> IntoIterator for &'a HistorySeries {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.candles.iter()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn candle(open_time: i64, close: Decimal) -> Candle {
        Candle {
            open_time,
            open: dec!(100),
            high: close.max(dec!(100)),
            low: close.min(dec!(100)),
            close,
        }
    }

    fn is_strictly_increasing(series: &HistorySeries) -> bool {
        series
            .as_slice()
            .windows(2)
            .all(|w| w[0].open_time < w[1].open_time)
    }

    #[test]
    fn from_candles_sorts_and_dedups() {
        let series = HistorySeries::from_candles(vec![
            candle(120, dec!(3)),
            candle(60, dec!(1)),
            candle(120, dec!(9)),
            candle(180, dec!(4)),
        ]);

        assert_eq!(series.len(), 3);
        assert!(is_strictly_increasing(&series));
        assert_eq!(series.as_slice()[1].close, dec!(3));
    }

    #[test]
    fn merge_into_empty_inserts_single_candle() {
        let mut series = HistorySeries::new();
        assert_eq!(series.merge(candle(60, dec!(101))), Merge::Replaced);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn merge_same_time_replaces_in_place() {
        let mut series =
            HistorySeries::from_candles(vec![candle(60, dec!(100)), candle(120, dec!(101))]);
        assert_eq!(series.merge(candle(120, dec!(105))), Merge::Replaced);
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().close, dec!(105));
        assert_eq!(series.as_slice()[0].close, dec!(100));
    }

    #[test]
    fn merge_later_time_appends() {
        let mut series = HistorySeries::from_candles(vec![candle(60, dec!(100))]);
        assert_eq!(series.merge(candle(120, dec!(99))), Merge::Appended);
        assert_eq!(series.len(), 2);
        assert!(is_strictly_increasing(&series));
    }

    #[test]
    fn merge_older_time_is_discarded() {
        let mut series =
            HistorySeries::from_candles(vec![candle(60, dec!(100)), candle(120, dec!(101))]);
        let before = series.clone();
        assert_eq!(series.merge(candle(60, dec!(200))), Merge::Stale);
        assert_eq!(series, before);
    }

    #[test]
    fn mixed_delta_sequence_keeps_order() {
        let mut series = HistorySeries::new();
        for t in [60, 60, 120, 60, 180, 180, 120, 240, 30] {
            series.merge(candle(t, dec!(100)));
            assert!(is_strictly_increasing(&series));
        }
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn long_stream_stays_bounded() {
        let full: Vec<Candle> = (1..=MAX_SERIES_LEN as i64)
            .map(|i| candle(i * 60, dec!(100)))
            .collect();
        let mut series = HistorySeries::from_candles(full);

        assert_eq!(series.merge(candle(0, dec!(1))), Merge::Stale);
        let next = (MAX_SERIES_LEN as i64 + 1) * 60;
        assert_eq!(series.merge(candle(next, dec!(101))), Merge::Appended);

        assert_eq!(series.len(), MAX_SERIES_LEN);
        assert_eq!(series.as_slice()[0].open_time, 120);
        assert_eq!(series.last().unwrap().open_time, next);
        assert!(is_strictly_increasing(&series));
    }

    #[test]
    fn oversized_snapshot_keeps_newest() {
        let candles: Vec<Candle> = (0..MAX_SERIES_LEN as i64 + 10)
            .map(|i| candle(i, dec!(100)))
            .collect();
        let series = HistorySeries::from_candles(candles);

        assert_eq!(series.len(), MAX_SERIES_LEN);
        assert_eq!(series.as_slice()[0].open_time, 10);
    }

    #[test]
    fn inconsistent_ohlc_is_stored_as_is() {
        let weird = Candle {
            open_time: 60,
            open: dec!(10),
            high: dec!(5),
            low: dec!(20),
            close: dec!(7),
        };
        let mut series = HistorySeries::new();
        series.merge(weird);
        assert_eq!(series.last(), Some(&weird));
    }
}
