//! Data model shared by the loader, the feed, the engine and the renderers.
//!
//! Contains the interval catalog, chart styles, canonical candle types,
//! exchange wire formats and the derived display statistics.

pub mod candle;
pub mod interval;
pub mod kline;
pub mod stats;
pub mod style;

pub use candle::{Candle, HistorySeries, LiveDelta, MAX_SERIES_LEN, Merge};
pub use interval::{Interval, IntervalGroup, groups};
pub use stats::{DisplayStats, format_remaining};
pub use style::ChartStyle;
