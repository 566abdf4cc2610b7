//! Chart visual styles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChartError;

/// How a candle series is drawn. Purely a rendering selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartStyle {
    #[default]
    Candlestick,
    Line,
    Area,
    Bar,
}

impl ChartStyle {
    pub const ALL: [ChartStyle; 4] = [
        ChartStyle::Candlestick,
        ChartStyle::Line,
        ChartStyle::Area,
        ChartStyle::Bar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartStyle::Candlestick => "candlestick",
            ChartStyle::Line => "line",
            ChartStyle::Area => "area",
            ChartStyle::Bar => "bar",
        }
    }

    /// Returns `true` when the style draws full OHLC bars rather than a
    /// single value per candle.
    pub fn uses_ohlc(self) -> bool {
        matches!(self, ChartStyle::Candlestick | ChartStyle::Bar)
    }

    /// Cycles to the next style.
    pub fn next(self) -> ChartStyle {
        match self {
            ChartStyle::Candlestick => ChartStyle::Line,
            ChartStyle::Line => ChartStyle::Area,
            ChartStyle::Area => ChartStyle::Bar,
            ChartStyle::Bar => ChartStyle::Candlestick,
        }
    }
}

impl fmt::Display for ChartStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartStyle {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartStyle::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ChartError::InvalidArgument(format!("unknown chart style '{s}'")))
    }
}
