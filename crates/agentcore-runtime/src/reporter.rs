//! Progress reporting over the caller's event callback.
//!
//! Every event returns the callback's verdict. An `Err` means the caller wants
//! the run to stop; the reporter hands that error back untouched.

use agentcore_core::{Action, ResourceStatus, ResourceType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of a resource as reported in a [`ResourceResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Created,
    Updated,
    Deleted,
}

impl ResultStatus {
    /// Event status for a successful apply outcome. `None` for `Failed`.
    pub fn from_resource_status(status: ResourceStatus) -> Option<Self> {
        match status {
            ResourceStatus::Created => Some(Self::Created),
            ResourceStatus::Updated => Some(Self::Updated),
            ResourceStatus::Failed => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource operation that succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResult {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub action: Action,
    pub status: ResultStatus,
    /// Provider identifier of the resource.
    pub detail: String,
}

/// Events delivered to the callback during apply and destroy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ApplyEvent {
    Progress { message: String, fraction: f64 },
    Resource(ResourceResult),
    /// A resource operation failed. Informational; the run continues.
    Error {
        #[serde(rename = "type")]
        resource_type: ResourceType,
        name: String,
        message: String,
    },
}

/// Caller-supplied event sink.
pub trait ApplyCallback: Send {
    fn on_event(&mut self, event: &ApplyEvent) -> anyhow::Result<()>;
}

impl<F> ApplyCallback for F
where
    F: FnMut(&ApplyEvent) -> anyhow::Result<()> + Send,
{
    fn on_event(&mut self, event: &ApplyEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Typed front end over an [`ApplyCallback`].
///
/// Fractions are clamped to `[0, 1]` and never move backwards within one run.
pub struct ProgressReporter<'a> {
    callback: &'a mut dyn ApplyCallback,
    last_fraction: f64,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: &'a mut dyn ApplyCallback) -> Self {
        Self {
            callback,
            last_fraction: 0.0,
        }
    }

    pub fn progress(&mut self, message: impl Into<String>, fraction: f64) -> anyhow::Result<()> {
        let fraction = fraction.clamp(0.0, 1.0).max(self.last_fraction);
        self.last_fraction = fraction;
        self.callback.on_event(&ApplyEvent::Progress {
            message: message.into(),
            fraction,
        })
    }

    pub fn resource(&mut self, result: ResourceResult) -> anyhow::Result<()> {
        self.callback.on_event(&ApplyEvent::Resource(result))
    }

    pub fn error(
        &mut self,
        resource_type: ResourceType,
        name: &str,
        err: &dyn std::error::Error,
    ) -> anyhow::Result<()> {
        self.callback.on_event(&ApplyEvent::Error {
            resource_type,
            name: name.to_string(),
            message: err.to_string(),
        })
    }

    /// Highest fraction reported so far.
    pub fn last_fraction(&self) -> f64 {
        self.last_fraction
    }
}
