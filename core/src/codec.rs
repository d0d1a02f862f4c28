//! Bidirectional mapping between [`Transaction`] and its wire JSON object.
//!
//! # Design
//! Encoding is explicit, field-by-field conditional emission over a
//! `serde_json::Map` instead of a serde derive: earlier revisions of the
//! service contract alternated between unix-epoch and ISO-8601 dates and
//! between several omission tricks, and a single hand-rolled path is the
//! one place where both decisions are pinned down and testable.
//!
//! The canonical date form is RFC 3339 with an explicit UTC offset and
//! seconds precision (`2023-01-15T12:30:00Z`). Decode accepts exactly that
//! family — integer epoch dates from older revisions are rejected so a
//! mismatched service version surfaces as a decode error instead of silent
//! corruption. Likewise an `action` tag outside the known eight is an
//! error, never a default.
//!
//! Optional fields that are absent, zero, or empty are never emitted: the
//! service treats key presence as meaningful. Decode normalizes the same
//! degenerate values back to `None`, so encode∘decode is stable.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::types::{Transaction, TxAction};

/// Encode a transaction into its wire JSON object.
///
/// Pure and total: any well-formed [`Transaction`] encodes without error.
/// Well-formed means finite numerics — JSON has no representation for NaN
/// or infinity, so those are a caller bug and trip a debug assertion.
pub fn encode(tx: &Transaction) -> Value {
    debug_assert!(tx.volume.is_finite(), "volume must be finite");
    let mut obj = Map::new();
    obj.insert("date".to_string(), Value::String(encode_date(tx.date)));
    obj.insert("action".to_string(), Value::String(tx.action.as_str().to_string()));
    obj.insert("symbol".to_string(), Value::String(tx.symbol.clone()));
    obj.insert("currency".to_string(), Value::String(tx.currency.clone()));
    obj.insert("volume".to_string(), number(tx.volume));

    put_string(&mut obj, "exchange", &tx.exchange);
    put_string(&mut obj, "exchangeid", &tx.exchange_id);
    put_number(&mut obj, "price", tx.price);
    put_number(&mut obj, "total", tx.total);
    put_number(&mut obj, "fee", tx.fee);
    put_string(&mut obj, "feecurrency", &tx.fee_currency);
    put_string(&mut obj, "memo", &tx.memo);
    put_string(&mut obj, "txhash", &tx.tx_hash);
    put_string(&mut obj, "sender", &tx.sender);
    put_string(&mut obj, "recipient", &tx.recipient);
    put_string(&mut obj, "id", &tx.id);

    Value::Object(obj)
}

/// Decode one wire JSON object into a [`Transaction`].
pub fn decode(value: &Value) -> Result<Transaction, ApiError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ApiError::Decode("transaction is not a JSON object".to_string()))?;

    let date = decode_date(obj)?;
    let action = decode_action(obj)?;
    let symbol = required_string(obj, "symbol")?;
    let currency = required_string(obj, "currency")?;
    let volume = required_number(obj, "volume")?;

    Ok(Transaction {
        date,
        action,
        symbol,
        currency,
        volume,
        exchange: optional_string(obj, "exchange")?,
        exchange_id: optional_string(obj, "exchangeid")?,
        price: optional_number(obj, "price")?,
        total: optional_number(obj, "total")?,
        fee: optional_number(obj, "fee")?,
        fee_currency: optional_string(obj, "feecurrency")?,
        memo: optional_string(obj, "memo")?,
        tx_hash: optional_string(obj, "txhash")?,
        sender: optional_string(obj, "sender")?,
        recipient: optional_string(obj, "recipient")?,
        id: optional_string(obj, "id")?,
    })
}

/// The canonical wire form for dates: RFC 3339, UTC offset spelled `Z`,
/// seconds precision.
fn encode_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode_date(obj: &Map<String, Value>) -> Result<DateTime<Utc>, ApiError> {
    let value = obj
        .get("date")
        .ok_or_else(|| ApiError::Decode("missing required field `date`".to_string()))?;
    let s = value.as_str().ok_or_else(|| {
        ApiError::Decode(format!("field `date` must be an ISO-8601 string, got {value}"))
    })?;
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Decode(format!("malformed date `{s}`: {e}")))
}

fn decode_action(obj: &Map<String, Value>) -> Result<TxAction, ApiError> {
    let tag = required_string(obj, "action")?;
    tag.parse::<TxAction>()
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn required_string(obj: &Map<String, Value>, key: &str) -> Result<String, ApiError> {
    let value = obj
        .get(key)
        .ok_or_else(|| ApiError::Decode(format!("missing required field `{key}`")))?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Decode(format!("field `{key}` must be a string, got {value}")))
}

fn required_number(obj: &Map<String, Value>, key: &str) -> Result<f64, ApiError> {
    let value = obj
        .get(key)
        .ok_or_else(|| ApiError::Decode(format!("missing required field `{key}`")))?;
    value
        .as_f64()
        .ok_or_else(|| ApiError::Decode(format!("field `{key}` must be a number, got {value}")))
}

/// Absent, null, and empty-string all normalize to `None`.
fn optional_string(obj: &Map<String, Value>, key: &str) -> Result<Option<String>, ApiError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ApiError::Decode(format!(
            "field `{key}` must be a string, got {other}"
        ))),
    }
}

/// Absent, null, and zero all normalize to `None`.
fn optional_number(obj: &Map<String, Value>, key: &str) -> Result<Option<f64>, ApiError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => {
            let n = value.as_f64().ok_or_else(|| {
                ApiError::Decode(format!("field `{key}` must be a number, got {value}"))
            })?;
            Ok(if n == 0.0 { None } else { Some(n) })
        }
    }
}

fn put_string(obj: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(s) = value {
        if !s.is_empty() {
            obj.insert(key.to_string(), Value::String(s.clone()));
        }
    }
}

fn put_number(obj: &mut Map<String, Value>, key: &str, value: Option<f64>) {
    if let Some(n) = value {
        debug_assert!(n.is_finite(), "`{key}` must be finite");
        if n != 0.0 {
            obj.insert(key.to_string(), number(n));
        }
    }
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
