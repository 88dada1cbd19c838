//! Engine protocol exchanged with the host.
//!
//! The host calls the transformation once per event with `{ "Data": ... }` and
//! receives either `{ "Data": ..., "PartitionKey": ... }` or
//! `{ "FilterOut": true }` back.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::event::EventData;

/// Per-invocation input.
///
/// Enriched events arrive as an object. Other sources hand `Data` over as
/// JSON text, which is parsed here so every transformation sees a property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineInput {
    #[serde(rename = "Data", deserialize_with = "event_data_or_json_text")]
    pub data: EventData,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputData {
    Object(EventData),
    JsonText(String),
}

fn event_data_or_json_text<'de, D>(deserializer: D) -> Result<EventData, D::Error>
where
    D: Deserializer<'de>,
{
    match InputData::deserialize(deserializer)? {
        InputData::Object(data) => Ok(data),
        InputData::JsonText(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
    }
}

impl EngineInput {
    pub fn new(data: EventData) -> Self {
        Self { data }
    }
}

/// Typed result of one transformation call.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutcome<T> {
    /// Forward `data` downstream.
    Forward {
        data: T,
        partition_key: Option<String>,
        http_headers: BTreeMap<String, String>,
    },
    /// Drop the event silently.
    FilterOut,
}

impl<T> TransformOutcome<T> {
    pub fn forward(data: T) -> Self {
        Self::Forward {
            data,
            partition_key: None,
            http_headers: BTreeMap::new(),
        }
    }

    /// Sets the partition key on a forwarded outcome; no-op on `FilterOut`.
    #[must_use]
    pub fn with_partition_key(self, key: Option<String>) -> Self {
        match self {
            Self::Forward {
                data, http_headers, ..
            } => Self::Forward {
                data,
                partition_key: key.filter(|k| !k.is_empty()),
                http_headers,
            },
            Self::FilterOut => Self::FilterOut,
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, Self::FilterOut)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Forward { data, .. } => Some(data),
            Self::FilterOut => None,
        }
    }
}

/// Wire form of [`TransformOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput<T> {
    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(
        rename = "PartitionKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub partition_key: Option<String>,
    #[serde(rename = "FilterOut", default, skip_serializing_if = "is_false")]
    pub filter_out: bool,
    #[serde(
        rename = "HTTPHeaders",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub http_headers: BTreeMap<String, String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl<T> From<TransformOutcome<T>> for EngineOutput<T> {
    fn from(outcome: TransformOutcome<T>) -> Self {
        match outcome {
            TransformOutcome::Forward {
                data,
                partition_key,
                http_headers,
            } => Self {
                data: Some(data),
                partition_key,
                filter_out: false,
                http_headers,
            },
            TransformOutcome::FilterOut => Self {
                data: None,
                partition_key: None,
                filter_out: true,
                http_headers: BTreeMap::new(),
            },
        }
    }
}
