//! Configuration validation.
//!
//! A configuration is checked once, before any event is read. Any error-level
//! issue aborts the transformation; warnings are informational.
//!
//! Checks, in order:
//!
//! 1. `apiKey` is non-empty
//! 2. `includeEntities` is `all` or `none`
//! 3. every entity mapping rule has a key, a known target and a known version
//! 4. every entity exclusion rule has a key and a known version
//! 5. every event/user mapping rule has a key
//! 6. `amplitudeTime` is known, and `timeProp` is set for `eventProperty`

mod error;
mod validator;

pub use error::ConfigError;
pub use validator::{Issue, Severity, ValidationReport, Validator};

use amp_model::{RawTransformConfig, TransformConfig};
use tracing::{debug, warn};

/// Returns true when `config` has no error-level issues.
pub fn validate(config: &RawTransformConfig) -> bool {
    !Validator::new().check(config).has_errors()
}

/// Validates `raw` and converts it into the typed configuration.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] carrying every error-level issue found.
pub fn into_config(raw: RawTransformConfig) -> Result<TransformConfig, ConfigError> {
    let report = Validator::new().check(&raw);
    for issue in &report.issues {
        match issue.severity {
            Severity::Error => warn!(field = %issue.field, "{}", issue.message),
            Severity::Warning => debug!(field = %issue.field, "{}", issue.message),
        }
    }
    if report.has_errors() {
        return Err(ConfigError::Invalid {
            issues: report.into_errors(),
        });
    }
    Ok(TransformConfig::try_from(raw)?)
}
