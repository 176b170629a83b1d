//! Error types for the runtime crate.

use agentcore_core::{Action, ConfigError, PackError, ResourceType, StateError};
use std::fmt;
use thiserror::Error;

use crate::adapter::ClientError;

/// One resource operation that the provider rejected.
#[derive(Debug, Error)]
#[error("failed to {action} {resource_type} '{name}': {source}")]
pub struct ResourceFailure {
    pub resource_type: ResourceType,
    pub name: String,
    pub action: Action,
    #[source]
    pub source: ClientError,
}

/// Every per-resource failure of an apply or destroy, in the order they
/// happened.
///
/// The first failure is the root: it leads the message and is what
/// [`std::error::Error::source`] returns.
#[derive(Debug, Default)]
pub struct ApplyErrors {
    failures: Vec<ResourceFailure>,
}

impl ApplyErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: ResourceFailure) {
        self.failures.push(failure);
    }

    /// Append another composite, keeping this one's root.
    pub fn extend(&mut self, other: ApplyErrors) {
        self.failures.extend(other.failures);
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn first(&self) -> Option<&ResourceFailure> {
        self.failures.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceFailure> {
        self.failures.iter()
    }

    /// `None` when nothing failed.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

impl fmt::Display for ApplyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut failures = self.failures.iter();
        match failures.next() {
            Some(first) => write!(f, "{}", first)?,
            None => return f.write_str("no resource failures"),
        }
        for failure in failures {
            write!(f, "; also: {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApplyErrors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.failures
            .first()
            .map(|f| f as &(dyn std::error::Error + 'static))
    }
}

/// Fatal outcomes of plan, apply, destroy and status.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Pack(#[from] PackError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    State(#[from] StateError),

    /// The event callback asked to stop. Nothing was persisted.
    #[error("cancelled by callback: {0}")]
    Callback(#[source] anyhow::Error),

    /// Destroy could not remove every resource.
    #[error(transparent)]
    Resources(ApplyErrors),
}

impl DeployError {
    pub fn is_callback(&self) -> bool {
        matches!(self, Self::Callback(_))
    }

    /// The callback's own error, unchanged.
    pub fn into_callback_error(self) -> Option<anyhow::Error> {
        match self {
            Self::Callback(e) => Some(e),
            _ => None,
        }
    }
}
