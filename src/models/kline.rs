//! Binance kline wire formats.
//!
//! Stream envelopes (`<symbol>@kline_<interval>`) and REST `klines` rows,
//! plus their conversion into the canonical [`Candle`] / [`LiveDelta`]
//! types. Exchange timestamps are milliseconds; canonical candle times are
//! seconds.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use serde_json::Value;

use super::candle::{Candle, LiveDelta};
use crate::{ChartError, Result};

/// A kline stream message.
#[derive(Debug, Clone, Deserialize)]
pub struct KlineEvent {
    /// Event time in milliseconds.
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "k")]
    pub kline: KlinePayload,
}

/// The candle carried by a [`KlineEvent`].
#[derive(Debug, Clone, Deserialize)]
pub struct KlinePayload {
    /// Candle open time in milliseconds.
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
}

impl TryFrom<KlineEvent> for LiveDelta {
    type Error = ChartError;

    fn try_from(event: KlineEvent) -> Result<Self> {
        let k = event.kline;
        for (name, price) in [
            ("open", k.open),
            ("high", k.high),
            ("low", k.low),
            ("close", k.close),
        ] {
            ensure_non_negative(name, price)?;
        }

        Ok(Self {
            open_time: k.open_time.div_euclid(1_000),
            open: k.open,
            high: k.high,
            low: k.low,
            close: k.close,
            event_time: event.event_time,
        })
    }
}

/// Converts one REST `klines` row
/// (`[openTime_ms, open, high, low, close, ...]`) into a candle.
///
/// Numeric fields may be JSON strings or numbers; trailing fields are ignored.
///
/// # Errors
///
/// Returns [`ChartError::MalformedMessage`] if the row is shorter than five
/// fields or a field is not a valid non-negative number.
pub fn candle_from_row(row: &[Value]) -> Result<Candle> {
    if row.len() < 5 {
        return Err(ChartError::MalformedMessage(format!(
            "kline row has {} fields, expected at least 5",
            row.len()
        )));
    }

    let open_time_ms = row[0]
        .as_i64()
        .or_else(|| row[0].as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| ChartError::MalformedMessage(format!("invalid open time: {}", row[0])))?;

    Ok(Candle {
        open_time: open_time_ms.div_euclid(1_000),
        open: price_field("open", &row[1])?,
        high: price_field("high", &row[2])?,
        low: price_field("low", &row[3])?,
        close: price_field("close", &row[4])?,
    })
}

/// Converts a whole REST `klines` response body.
///
/// # Errors
///
/// Fails if the body is not an array of arrays or any row is malformed.
pub fn candles_from_payload(payload: Value) -> Result<Vec<Candle>> {
    let rows = match payload {
        Value::Array(rows) => rows,
        other => {
            return Err(ChartError::MalformedMessage(format!(
                "expected kline array, got {}",
                type_name(&other)
            )));
        }
    };

    rows.iter()
        .map(|row| match row {
            Value::Array(fields) => candle_from_row(fields),
            other => Err(ChartError::MalformedMessage(format!(
                "expected kline row array, got {}",
                type_name(other)
            ))),
        })
        .collect()
}

fn price_field(name: &str, value: &Value) -> Result<Decimal> {
    let parsed = match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        _ => None,
    };

    let price = parsed
        .ok_or_else(|| ChartError::MalformedMessage(format!("invalid {name} price: {value}")))?;
    ensure_non_negative(name, price)?;
    Ok(price)
}

fn ensure_non_negative(name: &str, price: Decimal) -> Result<()> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ChartError::MalformedMessage(format!(
            "{name} price must be non-negative, got {price}"
        )));
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
