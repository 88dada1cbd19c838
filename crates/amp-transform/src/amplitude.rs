//! The Amplitude transformation entry point.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use amp_map::{EntityRules, event_properties, route, user_properties};
use amp_model::{
    AmplitudePayload, EngineInput, RawTransformConfig, TransformConfig, TransformOutcome,
};
use amp_validate::ConfigError;

use crate::Transformation;
use crate::assemble::{Derived, assemble};
use crate::time::{resolve_session, resolve_time};

/// Transforms enriched events into Amplitude HTTP API upload bodies.
///
/// Construction validates the configuration and compiles the entity rules
/// once; every call to [`Transformation::transform`] reuses them.
#[derive(Debug, Clone)]
pub struct AmplitudeTransformation {
    config: TransformConfig,
    rules: EntityRules,
}

impl AmplitudeTransformation {
    /// Builds a transformation from an already typed configuration.
    pub fn new(config: TransformConfig) -> Self {
        let rules = EntityRules::compile(&config);
        debug!(
            inclusions = rules.inclusions.len(),
            exclusions = rules.exclusions.len(),
            "amplitude transformation ready"
        );
        Self { config, rules }
    }

    /// Validates `raw` and builds a transformation from it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration has any
    /// error-level issue.
    pub fn from_raw(raw: RawTransformConfig) -> Result<Self, ConfigError> {
        amp_validate::into_config(raw).map(Self::new)
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn rules(&self) -> &EntityRules {
        &self.rules
    }

    /// Builds the payload for one event, reading `now` for `current` time.
    pub fn payload_at(&self, input: &EngineInput, now: DateTime<Utc>) -> AmplitudePayload {
        let event = &input.data;

        // routed properties are written last and win on conflict
        let mut event_props = event_properties(event, &self.config);
        let mut user_props = user_properties(event, &self.config);
        let routed = route(event, &self.config, &self.rules);
        event_props.extend(routed.event_properties);
        user_props.extend(routed.user_properties);

        let derived = Derived {
            time: resolve_time(event, &self.config.amplitude_time, now),
            session_id: resolve_session(event),
            event_properties: event_props,
            user_properties: user_props,
        };
        let amplitude_event = assemble(event, &self.config, derived);
        trace!(
            event_properties = amplitude_event.event_properties.len(),
            user_properties = amplitude_event.user_properties.len(),
            "assembled amplitude event"
        );
        AmplitudePayload::single(self.config.api_key.clone(), amplitude_event)
    }
}

impl Transformation for AmplitudeTransformation {
    type Output = AmplitudePayload;

    fn name(&self) -> &'static str {
        "amplitude"
    }

    fn transform(&self, input: &EngineInput) -> TransformOutcome<AmplitudePayload> {
        TransformOutcome::forward(self.payload_at(input, Utc::now()))
    }
}
