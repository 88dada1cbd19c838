//! Shared types for the Amplitude transformation.
//!
//! - **config**: raw (as loaded) and typed (as validated) transformation configuration
//! - **contexts**: well-known entity property names
//! - **event**: the enriched event property bag handed over by the host
//! - **amplitude**: the outbound Amplitude HTTP API payload
//! - **protocol**: the engine protocol exchanged with the host per invocation

pub mod amplitude;
pub mod config;
pub mod contexts;
pub mod error;
pub mod event;
pub mod protocol;

pub use amplitude::{AmplitudeEvent, AmplitudePayload, PropertyMap};
pub use config::{
    AmplitudeTime, EntityTarget, ExclusionRule, IncludeEntities, InclusionRule,
    RawExclusionRule, RawInclusionRule, RawSimpleRule, RawTransformConfig, RuleVersion,
    SimpleRule, TransformConfig,
};
pub use error::{ModelError, Result};
pub use event::{ATOMIC_TIMESTAMPS, EventData, EventValue};
pub use protocol::{EngineInput, EngineOutput, TransformOutcome};
