//! Property mapping for the Amplitude transformation.
//!
//! - **schema**: canonicalization of `iglu:` schema URIs into entity property names
//! - **rules**: compilation of entity inclusion/exclusion rules into ordered match tables
//! - **router**: placement of entity and self-describing event properties
//! - **common**: fixed and explicitly mapped event/user properties

pub mod common;
pub mod router;
pub mod rules;
pub mod schema;

pub use common::{event_properties, mapped_properties, user_properties};
pub use router::{RoutedProperties, route};
pub use rules::{CompiledRule, EntityRule, EntityRules, RuleTable, compile};
pub use schema::{SchemaKey, SchemaKeyError, canonicalize};
