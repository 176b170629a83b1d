//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while parsing or validating the deploy configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for `AgentCoreConfig`.
    #[error("failed to parse deploy config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field is missing or empty.
    #[error("deploy config: missing required field '{0}'")]
    MissingField(&'static str),

    /// A field is present but holds an unusable value.
    #[error("deploy config: invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while parsing or validating a pack.
#[derive(Debug, Error)]
pub enum PackError {
    /// The pack text is not valid pack JSON.
    #[error("failed to parse pack: {0}")]
    Parse(#[from] serde_json::Error),

    /// The pack parsed but is structurally unusable.
    #[error("invalid pack: {0}")]
    Invalid(String),
}

/// Errors raised while encoding or strictly decoding an `AdapterState` document.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state could not be written as JSON.
    #[error("failed to serialize adapter state: {0}")]
    Encode(#[source] serde_json::Error),

    /// The state document could not be read.
    #[error("failed to parse adapter state: {0}")]
    Decode(#[source] serde_json::Error),
}
