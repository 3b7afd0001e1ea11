//! Per-collection adapters for the listing engine

pub mod jobs;
pub mod posts;

pub use jobs::{Job, JobsDomain};
pub use posts::{Post, PostsDomain};

use jiff::Timestamp;
use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Thousands-separated counter ("12,345")
pub(crate) fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub(crate) fn format_timestamp(ts: Option<&Timestamp>) -> String {
    match ts {
        Some(ts) => ts.strftime("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}

/// Deserialize `null` as the type's default. A missing key still needs
/// `#[serde(default)]` alongside this.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Display-only timestamp: anything unreadable becomes `None` instead of an
/// error.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = raw.as_ref().and_then(parse_timestamp);
    if parsed.is_none()
        && let Some(raw) = raw.filter(|v| !v.is_null())
    {
        tracing::debug!(value = %raw, "Ignoring unreadable timestamp");
    }
    Ok(parsed)
}

/// RFC 3339 strings, offset-less date-times and dates (read as UTC), epoch
/// milliseconds, or `{ "seconds": n }` objects
fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(ts) = s.parse::<Timestamp>() {
                return Some(ts);
            }
            let civil = s.parse::<DateTime>().ok().or_else(|| {
                s.parse::<Date>()
                    .ok()
                    .map(|d| d.to_datetime(Time::midnight()))
            })?;
            civil.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp())
        }
        Value::Number(n) => n.as_i64().and_then(|ms| Timestamp::from_millisecond(ms).ok()),
        Value::Object(map) => map
            .get("seconds")
            .or_else(|| map.get("_seconds"))
            .and_then(Value::as_i64)
            .and_then(|secs| Timestamp::from_second(secs).ok()),
        _ => None,
    }
}
