//! Stored instant decoding.
//!
//! Documents written by different clients carry timestamps in different
//! shapes. Everything is decoded into `DateTime<Utc>`; everything we write is
//! RFC 3339.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Decode a stored instant, returning `None` for anything unrecognised.
///
/// Accepted shapes:
/// - RFC 3339 strings (our canonical write format)
/// - SQLite `datetime()` strings, with or without fractional seconds
/// - `{"seconds": .., "nanoseconds": ..}` and `{"_seconds": .., "_nanoseconds": ..}`
/// - integer epoch milliseconds
pub fn decode(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::Object(map) => {
            let seconds = map
                .get("seconds")
                .or_else(|| map.get("_seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("nanoseconds")
                .or_else(|| map.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).ok()?;
            Utc.timestamp_opt(seconds, nanos).single()
        }
        _ => None,
    }
}

/// Decode an optional field, falling back to `default` when absent or invalid.
pub fn decode_or(value: Option<&Value>, default: DateTime<Utc>) -> DateTime<Utc> {
    value.and_then(decode).unwrap_or(default)
}

/// Encode an instant in the canonical stored form.
pub fn encode(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339())
}

/// Serde adapter for required stored instants.
pub mod required {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&at.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let value = Value::deserialize(d)?;
        super::decode(&value).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {value}")))
    }
}

/// Serde adapter for optional stored instants. Undecodable values read as `None`.
pub mod optional {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(at: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match at {
            Some(at) => s.serialize_str(&at.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Option::<Value>::deserialize(d)?;
        Ok(value.as_ref().and_then(super::decode))
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(ndt.and_utc());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    None
}
