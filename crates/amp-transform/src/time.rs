//! Event time and session id resolution.
//!
//! Both values are Unix epoch milliseconds. A value that cannot be derived is
//! `None` and the field is left out of the Amplitude event.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use amp_model::contexts::CLIENT_SESSION;
use amp_model::{ATOMIC_TIMESTAMPS, AmplitudeTime, EventData, EventValue};

const SESSION_START_FIELD: &str = "firstEventTimestamp";

/// Resolves the Amplitude `time` field.
///
/// - `No`: never set.
/// - `Current`: `now`.
/// - `EventProperty`: the value at `time_prop`. Atomic timestamp fields are
///   read as native timestamps; anything else is read as a leading integer.
pub fn resolve_time(event: &EventData, setting: &AmplitudeTime, now: DateTime<Utc>) -> Option<i64> {
    match setting {
        AmplitudeTime::No => None,
        AmplitudeTime::Current => Some(now.timestamp_millis()),
        AmplitudeTime::EventProperty { time_prop } => {
            let value = event.lookup_path(time_prop)?;
            let millis = if ATOMIC_TIMESTAMPS.contains(&time_prop.as_str()) {
                timestamp_millis(value)
            } else {
                leading_integer(value)
            };
            if millis.is_none() {
                debug!(time_prop = %time_prop, "time property did not resolve to a timestamp");
            }
            millis
        }
    }
}

/// Session id: start of the current client session.
pub fn resolve_session(event: &EventData) -> Option<i64> {
    let started = event.first_entity(CLIENT_SESSION)?.get(SESSION_START_FIELD)?;
    match started {
        EventValue::Int(millis) => Some(*millis),
        EventValue::Timestamp(ts) => Some(ts.timestamp_millis()),
        EventValue::Text(text) => parse_iso(text).map(|ts| ts.timestamp_millis()),
        _ => None,
    }
}

/// Milliseconds of a native timestamp, truncated from nanoseconds.
/// RFC 3339 text is accepted for events that were not type-promoted.
fn timestamp_millis(value: &EventValue) -> Option<i64> {
    let ts = match value {
        EventValue::Timestamp(ts) => *ts,
        EventValue::Text(text) => DateTime::parse_from_rfc3339(text).ok()?.with_timezone(&Utc),
        _ => return None,
    };
    Some(
        ts.timestamp_nanos_opt()
            .map_or_else(|| ts.timestamp_millis(), |nanos| nanos / 1_000_000),
    )
}

/// Integer prefix of a value: `"1659348000000ms"` reads as `1659348000000`,
/// floats are truncated, text without leading digits yields `None`.
fn leading_integer(value: &EventValue) -> Option<i64> {
    match value {
        EventValue::Int(n) => Some(*n),
        EventValue::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        EventValue::Text(text) => parse_leading_integer(text),
        EventValue::Timestamp(ts) => Some(ts.timestamp_millis()),
        _ => None,
    }
}

fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[..digits].parse::<i64>().ok().map(|n| sign * n)
}

/// ISO 8601 with an offset, or without one (read as UTC).
fn parse_iso(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
