//! Firestore typed values
//!
//! The REST API wraps every field in a single-key object naming its type
//! (`{"stringValue": "a"}`, `{"integerValue": "42"}`, ...). Documents are
//! handled as plain JSON objects everywhere else, so conversion happens at the
//! wire boundary only.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FirestoreValueError {
    #[error("expected a typed value object, got {0}")]
    NotTyped(String),
    #[error("unsupported value type '{0}'")]
    UnsupportedType(String),
    #[error("invalid integer value '{0}'")]
    InvalidInteger(String),
    #[error("invalid timestamp value '{0}'")]
    InvalidTimestamp(String),
    #[error("malformed '{0}'")]
    Malformed(&'static str),
}

/// Encode one JSON value as a Firestore value
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => encode_number(n),
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

fn encode_number(n: &Number) -> Value {
    // Integers travel as decimal strings; anything outside i64 becomes a double
    match n.as_i64() {
        Some(i) => json!({ "integerValue": i.to_string() }),
        None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
    }
}

/// Encode a JSON object as a Firestore `fields` map
pub fn encode_fields(map: &Map<String, Value>) -> Value {
    let fields: Map<String, Value> = map
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect();
    Value::Object(fields)
}

/// Decode one Firestore value into plain JSON
pub fn decode_value(value: &Value) -> Result<Value, FirestoreValueError> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(FirestoreValueError::NotTyped(value.to_string()));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => inner
            .as_bool()
            .map(Value::Bool)
            .ok_or(FirestoreValueError::Malformed("booleanValue")),
        "integerValue" => decode_integer(inner),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(FirestoreValueError::Malformed("doubleValue")),
        "timestampValue" => decode_timestamp(inner),
        // Bytes stay base64, references stay resource paths
        "stringValue" | "bytesValue" | "referenceValue" => inner
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or(FirestoreValueError::Malformed("stringValue")),
        "geoPointValue" => Ok(json!({
            "latitude": inner.get("latitude").cloned().unwrap_or(json!(0.0)),
            "longitude": inner.get("longitude").cloned().unwrap_or(json!(0.0)),
        })),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values.as_slice(),
                Some(_) => return Err(FirestoreValueError::Malformed("arrayValue")),
                None => &[],
            };
            values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        "mapValue" => match inner.get("fields") {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        other => Err(FirestoreValueError::UnsupportedType(other.to_string())),
    }
}

fn decode_integer(inner: &Value) -> Result<Value, FirestoreValueError> {
    match inner {
        Value::String(s) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| FirestoreValueError::InvalidInteger(s.clone())),
        Value::Number(n) if n.is_i64() => Ok(Value::Number(n.clone())),
        other => Err(FirestoreValueError::InvalidInteger(other.to_string())),
    }
}

fn decode_timestamp(inner: &Value) -> Result<Value, FirestoreValueError> {
    let raw = inner
        .as_str()
        .ok_or(FirestoreValueError::Malformed("timestampValue"))?;
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map_err(|_| FirestoreValueError::InvalidTimestamp(raw.to_string()))?;
    Ok(Value::String(
        parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
    ))
}

/// Decode a Firestore `fields` map into a JSON object
pub fn decode_fields(fields: &Value) -> Result<Map<String, Value>, FirestoreValueError> {
    let Some(fields) = fields.as_object() else {
        return Err(FirestoreValueError::Malformed("fields"));
    };
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), decode_value(value)?)))
        .collect()
}
