//! Fixed and rule-driven event/user property mappings.

use amp_model::contexts::SGTM_USER_DATA;
use amp_model::{EventData, EventValue, PropertyMap, SimpleRule, TransformConfig};

/// Marketing fields copied into user properties under their UTM names.
pub const MKT_TO_UTM: [(&str, &str); 5] = [
    ("mkt_source", "utm_source"),
    ("mkt_medium", "utm_medium"),
    ("mkt_campaign", "utm_campaign"),
    ("mkt_term", "utm_term"),
    ("mkt_content", "utm_content"),
];

/// Atomic fields copied into event properties when common event properties
/// are enabled.
const COMMON_EVENT_FIELDS: [(&str, &str); 4] = [
    ("page_url", "page_location"),
    ("doc_charset", "page_encoding"),
    ("page_referrer", "page_referrer"),
    ("page_title", "page_title"),
];

/// Resolves each rule's dotted path against the event and stores truthy
/// values under the rule's output key. Later rules overwrite earlier ones.
pub fn mapped_properties(rules: &[SimpleRule], event: &EventData) -> PropertyMap {
    let mut props = PropertyMap::new();
    for rule in rules {
        if let Some(value) = event.lookup_path(&rule.key).filter(|v| v.is_truthy()) {
            props.insert(rule.output_key().to_string(), value.clone());
        }
    }
    props
}

/// `<width>x<height>` when both dimensions are truthy.
fn dimensions(event: &EventData, width: &str, height: &str) -> Option<EventValue> {
    let width = event.get(width).filter(|v| v.is_truthy())?;
    let height = event.get(height).filter(|v| v.is_truthy())?;
    let rendered = format!(
        "{}x{}",
        width.to_display_string()?,
        height.to_display_string()?
    );
    Some(EventValue::Text(rendered))
}

/// Builds the event properties that do not come from entity routing.
pub fn event_properties(event: &EventData, config: &TransformConfig) -> PropertyMap {
    let mut props = PropertyMap::new();

    if config.include_common_event_properties {
        for (source, target) in COMMON_EVENT_FIELDS {
            if let Some(value) = event.get(source) {
                props.insert(target.to_string(), value.clone());
            }
        }
        let dims = [
            ("screen_resolution", "dvce_screenwidth", "dvce_screenheight"),
            ("viewport_size", "br_viewwidth", "br_viewheight"),
        ];
        for (target, width, height) in dims {
            if let Some(value) = dimensions(event, width, height) {
                props.insert(target.to_string(), value);
            }
        }
    }

    props.extend(mapped_properties(&config.event_mapping_rules, event));
    props
}

/// Builds the user properties that do not come from entity routing.
///
/// Sources are merged in order, later ones overwriting earlier ones: the
/// first server-side user data record, the UTM fields, then the configured
/// user mapping rules.
pub fn user_properties(event: &EventData, config: &TransformConfig) -> PropertyMap {
    let mut props = PropertyMap::new();

    if config.include_common_user_properties {
        if let Some(record) = event.first_entity(SGTM_USER_DATA).and_then(EventValue::as_object) {
            props.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    let mut rules: Vec<SimpleRule> = Vec::new();
    if config.mkt_to_user_utm {
        rules.extend(
            MKT_TO_UTM
                .iter()
                .map(|(key, mapped)| SimpleRule::new(*key, Some(*mapped))),
        );
    }
    rules.extend(config.user_mapping_rules.iter().cloned());
    props.extend(mapped_properties(&rules, event));
    props
}
