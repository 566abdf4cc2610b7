//! Wire-format and catalog tests against recorded Binance payloads.

use rust_decimal_macros::dec;

use candlesync::models::kline::{KlineEvent, candles_from_payload};
use candlesync::models::{
    ChartStyle, DisplayStats, HistorySeries, Interval, LiveDelta, format_remaining, groups,
};
use candlesync::websocket::decode_kline_event;

const KLINES_JSON: &str = include_str!("fixtures/klines.json");
const KLINE_EVENT_JSON: &str = include_str!("fixtures/kline_event.json");

#[test]
fn test_klines_payload_builds_ordered_series() {
    let payload: serde_json::Value =
        serde_json::from_str(KLINES_JSON).expect("Failed to parse klines fixture");
    let candles = candles_from_payload(payload).expect("Failed to convert klines");
    assert_eq!(candles.len(), 4);

    let series = HistorySeries::from_candles(candles);

    // The duplicated row for 1700000060 is dropped, keeping the first one.
    assert_eq!(series.len(), 3);
    let times: Vec<i64> = series.iter().map(|c| c.open_time).collect();
    assert_eq!(times, vec![1_700_000_000, 1_700_000_060, 1_700_000_120]);

    let second = &series.as_slice()[1];
    assert_eq!(second.open, dec!(37320.00000000));
    assert_eq!(second.high, dec!(37325.4));
    assert_eq!(second.low, dec!(37290));
    assert_eq!(second.close, dec!(37295.2));
}

#[test]
fn test_kline_event_deserializes() {
    let event: KlineEvent =
        serde_json::from_str(KLINE_EVENT_JSON).expect("Failed to deserialize kline event");

    assert_eq!(event.event_time, 1_700_000_150_500);
    assert_eq!(event.kline.open_time, 1_700_000_120_000);
    assert_eq!(event.kline.close, dec!(37412.5));
}

#[test]
fn test_kline_event_converts_to_delta_in_seconds() {
    let delta: LiveDelta = decode_kline_event(KLINE_EVENT_JSON).expect("Failed to decode");

    assert_eq!(delta.open_time, 1_700_000_120);
    assert_eq!(delta.open, dec!(37295.2));
    assert_eq!(delta.high, dec!(37420));
    assert_eq!(delta.low, dec!(37295.2));
    assert_eq!(delta.close, dec!(37412.5));
    assert_eq!(delta.event_time, 1_700_000_150_500);
}

#[test]
fn test_stream_delta_extends_snapshot() {
    let payload: serde_json::Value = serde_json::from_str(KLINES_JSON).unwrap();
    let mut series = HistorySeries::from_candles(candles_from_payload(payload).unwrap());
    let delta = decode_kline_event(KLINE_EVENT_JSON).unwrap();

    series.merge((&delta).into());

    assert_eq!(series.len(), 3);
    assert_eq!(series.last().unwrap().close, dec!(37412.5));

    let stats = DisplayStats::compute(series.last().unwrap(), Interval::M1, delta.event_time);
    // (1700000120 + 60) * 1000 - 1700000150500
    assert_eq!(stats.remaining_ms, 29_500);
    assert_eq!(stats.countdown(), "00:29");
    assert_eq!(stats.change, dec!(117.3));
    assert!(stats.is_up);
    assert_eq!(stats.marker_label(), "37412.50 | 00:29");
}

#[test]
fn test_interval_catalog_is_complete() {
    assert_eq!(Interval::ALL.len(), 16);
    let durations: Vec<i64> = Interval::ALL.iter().map(|i| i.duration_secs()).collect();
    assert_eq!(
        durations,
        vec![
            1, 60, 180, 300, 900, 1_800, 3_600, 7_200, 14_400, 21_600, 28_800, 43_200, 86_400,
            259_200, 604_800, 2_592_000,
        ]
    );
    let grouped: usize = groups().iter().map(|g| g.intervals.len()).sum();
    assert_eq!(grouped, Interval::ALL.len());
}

#[test]
fn test_interval_and_style_tokens_parse() {
    assert_eq!("1M".parse::<Interval>().unwrap(), Interval::Mo1);
    assert_eq!("1m".parse::<Interval>().unwrap(), Interval::M1);
    assert!("2m".parse::<Interval>().is_err());

    assert_eq!("bar".parse::<ChartStyle>().unwrap(), ChartStyle::Bar);
    assert!("heikin".parse::<ChartStyle>().is_err());
}

#[test]
fn test_format_remaining_examples() {
    assert_eq!(format_remaining(59_500), "00:59");
    assert_eq!(format_remaining(0), "00:00");
    assert_eq!(format_remaining(-1), "00:00");
    assert_eq!(format_remaining(3_600_000), "60:00");
}
