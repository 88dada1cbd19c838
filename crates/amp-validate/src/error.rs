use amp_model::ModelError;
use thiserror::Error;

use crate::validator::Issue;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid amplitude configuration provided ({} issue(s))", .issues.len())]
    Invalid { issues: Vec<Issue> },

    #[error(transparent)]
    Model(#[from] ModelError),
}
