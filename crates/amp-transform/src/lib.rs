//! Engine-protocol transformations.
//!
//! This crate turns one enriched event into one engine-protocol result:
//!
//! - **amplitude**: the Amplitude HTTP API transformation
//! - **assemble**: Amplitude event assembly from event data and derived properties
//! - **time**: event time and session id resolution
//! - **recipes**: small rewriting transformations (`web-uid`, `batmobile`)

pub mod amplitude;
pub mod assemble;
pub mod recipes;
pub mod time;

pub use amplitude::AmplitudeTransformation;
pub use assemble::{Derived, assemble, strip_nulls};
pub use recipes::{BatmobileFilter, WebUserId};
pub use time::{resolve_session, resolve_time};

use serde::Serialize;

use amp_model::{EngineInput, EngineOutput, TransformOutcome};

/// A per-event transformation invoked by the host.
///
/// Implementations hold only immutable state and can be shared across
/// threads.
pub trait Transformation: Send + Sync {
    /// Payload forwarded downstream.
    type Output: Serialize;

    /// Short identifier used in logs and on the command line.
    fn name(&self) -> &'static str;

    fn transform(&self, input: &EngineInput) -> TransformOutcome<Self::Output>;

    /// Runs [`Transformation::transform`] and converts the result to its wire form.
    fn run(&self, input: &EngineInput) -> EngineOutput<Self::Output> {
        self.transform(input).into()
    }
}
