//! Entity and self-describing event routing.

use tracing::trace;

use amp_model::{
    EntityTarget, EventData, EventValue, IncludeEntities, PropertyMap, TransformConfig,
};

use crate::rules::EntityRules;
use crate::schema::{CONTEXTS_PREFIX, SELF_DESCRIBING_PREFIX};

const SELF_DESCRIBING_RENAMED: &str = "self_describing_event_";

/// Properties placed by the router, one map per output namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutedProperties {
    pub event_properties: PropertyMap,
    pub user_properties: PropertyMap,
}

impl RoutedProperties {
    fn target_mut(&mut self, target: EntityTarget) -> &mut PropertyMap {
        match target {
            EntityTarget::EventProperties => &mut self.event_properties,
            EntityTarget::UserProperties => &mut self.user_properties,
        }
    }
}

/// Replaces a one-element array by its element when `extract` is set.
pub fn unwrap_single(value: &EventValue, extract: bool) -> EventValue {
    match value.as_array() {
        Some([only]) if extract => only.clone(),
        _ => value.clone(),
    }
}

/// Routes every self-describing event and entity property of `event`.
///
/// - `unstruct_event_*`, when enabled, is copied verbatim into event
///   properties as `self_describing_event_*`.
/// - `contexts_*` is dropped on the first exclusion match, otherwise placed by
///   the first inclusion match, otherwise handled by `include_entities`.
/// - Everything else is left to the common mappings.
pub fn route(event: &EventData, config: &TransformConfig, rules: &EntityRules) -> RoutedProperties {
    let mut routed = RoutedProperties::default();

    for (name, value) in event {
        if config.include_self_describing_event {
            if let Some(rest) = name.strip_prefix(SELF_DESCRIBING_PREFIX) {
                routed
                    .event_properties
                    .insert(format!("{SELF_DESCRIBING_RENAMED}{rest}"), value.clone());
                continue;
            }
        }

        if !name.starts_with(CONTEXTS_PREFIX) {
            continue;
        }

        if let Some(rule) = rules.exclusions.first_match(name) {
            trace!(property = %name, reference = %rule.reference, "entity excluded");
            continue;
        }

        let value = unwrap_single(value, config.extract_from_array);
        match rules.inclusions.first_match(name) {
            Some(rule) => {
                trace!(
                    property = %name,
                    reference = %rule.reference,
                    output = rule.output_key(),
                    target = rule.target().as_str(),
                    "entity included"
                );
                routed
                    .target_mut(rule.target())
                    .insert(rule.output_key().to_string(), value);
            }
            None => match config.include_entities {
                IncludeEntities::All => {
                    trace!(property = %name, "entity passed through");
                    routed.event_properties.insert(name.clone(), value);
                }
                IncludeEntities::None => {
                    trace!(property = %name, "unmatched entity dropped");
                }
            },
        }
    }

    routed
}
