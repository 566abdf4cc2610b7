//! Pure chart state: history plus the stats derived from its last candle.
//!
//! Nothing here talks to adapters or spawns tasks, so the merge rules can be
//! exercised directly.

use tracing::debug;

use crate::models::{Candle, DisplayStats, HistorySeries, Interval, LiveDelta, Merge};

/// The data half of the engine.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    interval: Option<Interval>,
    history: HistorySeries,
    stats: Option<DisplayStats>,
}

impl ChartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval the current history belongs to, `None` before the first seed
    /// and after [`clear`](Self::clear).
    pub fn interval(&self) -> Option<Interval> {
        self.interval
    }

    pub fn history(&self) -> &HistorySeries {
        &self.history
    }

    pub fn stats(&self) -> Option<&DisplayStats> {
        self.stats.as_ref()
    }

    /// Replaces the history wholesale and recomputes stats from its last
    /// candle as seen at `now_ms`.
    pub fn seed(
        &mut self,
        interval: Interval,
        series: HistorySeries,
        now_ms: i64,
    ) -> Option<DisplayStats> {
        self.interval = Some(interval);
        self.stats = series
            .last()
            .map(|candle| DisplayStats::compute(candle, interval, now_ms));
        self.history = series;
        self.stats
    }

    /// Merges a live delta into the history.
    ///
    /// Returns the merged candle with its fresh stats, or `None` when the
    /// delta was older than the last candle (or nothing was seeded yet) and
    /// the state is unchanged.
    pub fn merge(&mut self, delta: &LiveDelta) -> Option<(Candle, DisplayStats, Merge)> {
        let interval = self.interval?;
        let candle = Candle::from(delta);

        match self.history.merge(candle) {
            Merge::Stale => {
                debug!(
                    open_time = delta.open_time,
                    last = ?self.history.last().map(|c| c.open_time),
                    "Discarding out-of-order delta"
                );
                None
            }
            outcome => {
                let stats = DisplayStats::compute(&candle, interval, delta.event_time);
                self.stats = Some(stats);
                Some((candle, stats, outcome))
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
