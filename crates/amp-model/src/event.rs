//! The enriched event handed over by the host.
//!
//! An event is a flat bag of properties. Atomic fields hold scalars,
//! `contexts_*` properties hold arrays of entity records and
//! `unstruct_event_*` properties hold the self-describing event payload.

use std::collections::BTreeMap;
use std::collections::btree_map;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Atomic fields that the analytics SDK exposes as native timestamps.
pub const ATOMIC_TIMESTAMPS: [&str; 7] = [
    "collector_tstamp",
    "derived_tstamp",
    "true_tstamp",
    "dvce_created_tstamp",
    "dvce_sent_tstamp",
    "etl_tstamp",
    "refr_dvce_tstamp",
];

/// A single property value.
///
/// Deserialization never produces [`EventValue::Timestamp`]; see
/// [`EventData::promote_atomic_timestamps`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<EventValue>),
    Object(BTreeMap<String, EventValue>),
}

impl EventValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Truthiness as the Amplitude tag evaluates it: null, `false`, zero,
    /// NaN and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::Timestamp(_) | Self::Array(_) | Self::Object(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[EventValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, EventValue>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up one path segment: an object key, or an index into an array.
    pub fn get(&self, segment: &str) -> Option<&EventValue> {
        match self {
            Self::Object(map) => map.get(segment),
            Self::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Renders a scalar the way string concatenation would: integral floats
    /// lose their fractional part, everything non-scalar yields `None`.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::Float(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            Self::Float(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Null | Self::Timestamp(_) | Self::Array(_) | Self::Object(_) => None,
        }
    }
}

impl From<&str> for EventValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EventValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for EventValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for EventValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for EventValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for EventValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<serde_json::Value> for EventValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

/// One event's properties, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventData(BTreeMap<String, EventValue>);

impl EventData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, convenient for fixtures.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<EventValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<EventValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&EventValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, EventValue> {
        self.0.iter()
    }

    /// Resolves a `.`-separated path such as
    /// `contexts_com_acme_user_1.0.email`. Empty segments are skipped; the
    /// first segment names a top-level property.
    pub fn lookup_path(&self, path: &str) -> Option<&EventValue> {
        let mut segments = path.split('.').filter(|s| !s.is_empty());
        let first = segments.next()?;
        segments.try_fold(self.0.get(first)?, |value, segment| value.get(segment))
    }

    /// First record of an entity property, if the property is a non-empty array.
    pub fn first_entity(&self, name: &str) -> Option<&EventValue> {
        self.get(name)?.as_array()?.first()
    }

    /// Converts RFC 3339 text in the atomic timestamp fields to
    /// [`EventValue::Timestamp`]. Unparsable text is left untouched.
    pub fn promote_atomic_timestamps(&mut self) {
        for name in ATOMIC_TIMESTAMPS {
            let Some(value) = self.0.get_mut(name) else {
                continue;
            };
            let parsed = value
                .as_str()
                .and_then(|text| DateTime::parse_from_rfc3339(text).ok());
            if let Some(ts) = parsed {
                *value = EventValue::Timestamp(ts.with_timezone(&Utc));
            }
        }
    }
}

impl FromIterator<(String, EventValue)> for EventData {
    fn from_iter<I: IntoIterator<Item = (String, EventValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EventData {
    type Item = (&'a String, &'a EventValue);
    type IntoIter = btree_map::Iter<'a, String, EventValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
