//! Small event-rewriting transformations used in the getting-started guides.

use amp_model::{EngineInput, EventData, EventValue, TransformOutcome};

use crate::Transformation;

/// Keeps web events only and sets `uid` to the best available user id.
///
/// `uid` is `user_id` when that property exists (even if null), otherwise
/// `domain_userid`. The partition key is `app_id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebUserId;

impl Transformation for WebUserId {
    type Output = EventData;

    fn name(&self) -> &'static str {
        "web-uid"
    }

    fn transform(&self, input: &EngineInput) -> TransformOutcome<EventData> {
        let mut data = input.data.clone();
        if data.get("platform").and_then(EventValue::as_str) != Some("web") {
            return TransformOutcome::FilterOut;
        }

        let source = if data.contains("user_id") {
            "user_id"
        } else {
            "domain_userid"
        };
        if let Some(uid) = data.get(source).cloned() {
            data.insert("uid", uid);
        }

        let partition_key = data.get("app_id").and_then(EventValue::to_display_string);
        TransformOutcome::forward(data).with_partition_key(partition_key)
    }
}

/// Drops events with fewer than one batmobile and names the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatmobileFilter;

/// Numeric reading used for the `batmobileCount` comparison. Null and false
/// read as zero; text is parsed after trimming, blank text reads as zero.
fn as_count(value: &EventValue) -> Option<f64> {
    match value {
        EventValue::Null => Some(0.0),
        EventValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        EventValue::Int(n) => Some(*n as f64),
        EventValue::Float(f) => Some(*f),
        EventValue::Text(text) if text.trim().is_empty() => Some(0.0),
        EventValue::Text(text) => text.trim().parse().ok(),
        EventValue::Timestamp(_) | EventValue::Array(_) | EventValue::Object(_) => None,
    }
}

impl Transformation for BatmobileFilter {
    type Output = EventData;

    fn name(&self) -> &'static str {
        "batmobile"
    }

    fn transform(&self, input: &EngineInput) -> TransformOutcome<EventData> {
        let count = input.data.get("batmobileCount").and_then(as_count);
        if count.is_some_and(|n| n < 1.0) {
            return TransformOutcome::FilterOut;
        }

        let mut data = input.data.clone();
        data.insert("name", "Bruce Wayne");
        let partition_key = data.get("id").and_then(EventValue::to_display_string);
        TransformOutcome::forward(data).with_partition_key(partition_key)
    }
}
