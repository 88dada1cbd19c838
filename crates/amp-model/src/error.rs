use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown {field} value: '{value}'")]
    UnknownValue { field: &'static str, value: String },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

impl ModelError {
    pub(crate) fn unknown(field: &'static str, value: &str) -> Self {
        Self::UnknownValue {
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
