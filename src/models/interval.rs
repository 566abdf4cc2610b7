//! Candle interval catalog.
//!
//! Static lookup data only: wire tokens, bucket durations, menu grouping
//! and whether a historical snapshot exists for the interval.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ChartError;

/// Candle bucket duration selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1s")]
    S1,
    #[default]
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "3d")]
    D3,
    #[serde(rename = "1w")]
    W1,
    /// One month (wire token `"1M"`, fixed at 30 days).
    #[serde(rename = "1M")]
    Mo1,
}

/// A labelled group of intervals, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalGroup {
    pub label: &'static str,
    pub intervals: &'static [Interval],
}

const GROUPS: &[IntervalGroup] = &[
    IntervalGroup {
        label: "Seconds",
        intervals: &[Interval::S1],
    },
    IntervalGroup {
        label: "Minutes",
        intervals: &[
            Interval::M1,
            Interval::M3,
            Interval::M5,
            Interval::M15,
            Interval::M30,
        ],
    },
    IntervalGroup {
        label: "Hours",
        intervals: &[
            Interval::H1,
            Interval::H2,
            Interval::H4,
            Interval::H6,
            Interval::H8,
            Interval::H12,
        ],
    },
    IntervalGroup {
        label: "Days",
        intervals: &[Interval::D1, Interval::D3],
    },
    IntervalGroup {
        label: "Weeks",
        intervals: &[Interval::W1],
    },
    IntervalGroup {
        label: "Months",
        intervals: &[Interval::Mo1],
    },
];

/// Returns the interval groups in menu display order.
pub fn groups() -> &'static [IntervalGroup] {
    GROUPS
}

impl Interval {
    /// Every supported interval, shortest first.
    pub const ALL: [Interval; 16] = [
        Interval::S1,
        Interval::M1,
        Interval::M3,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H2,
        Interval::H4,
        Interval::H6,
        Interval::H8,
        Interval::H12,
        Interval::D1,
        Interval::D3,
        Interval::W1,
        Interval::Mo1,
    ];

    /// Returns the wire-format token used by both the REST and stream endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::S1 => "1s",
            Interval::M1 => "1m",
            Interval::M3 => "3m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H2 => "2h",
            Interval::H4 => "4h",
            Interval::H6 => "6h",
            Interval::H8 => "8h",
            Interval::H12 => "12h",
            Interval::D1 => "1d",
            Interval::D3 => "3d",
            Interval::W1 => "1w",
            Interval::Mo1 => "1M",
        }
    }

    /// Bucket length in seconds.
    pub fn duration_secs(self) -> i64 {
        match self {
            Interval::S1 => 1,
            Interval::M1 => 60,
            Interval::M3 => 180,
            Interval::M5 => 300,
            Interval::M15 => 900,
            Interval::M30 => 1_800,
            Interval::H1 => 3_600,
            Interval::H2 => 7_200,
            Interval::H4 => 14_400,
            Interval::H6 => 21_600,
            Interval::H8 => 28_800,
            Interval::H12 => 43_200,
            Interval::D1 => 86_400,
            Interval::D3 => 259_200,
            Interval::W1 => 604_800,
            Interval::Mo1 => 2_592_000,
        }
    }

    /// Returns `false` for the sub-minute `1s` interval, which is stream-only
    /// and must skip snapshot loading.
    pub fn has_snapshot(self) -> bool {
        self != Interval::S1
    }

    /// The next longer interval, wrapping to the shortest.
    pub fn next(self) -> Interval {
        let idx = self.position();
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// The next shorter interval, wrapping to the longest.
    pub fn previous(self) -> Interval {
        let idx = self.position();
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|i| *i == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| ChartError::InvalidArgument(format!("unknown interval '{s}'")))
    }
}
