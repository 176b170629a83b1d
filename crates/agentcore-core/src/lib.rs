use serde::{Deserialize, Serialize};
use std::fmt;

// Deploy configuration carried through every phase
pub mod config;
pub mod error;
pub mod pack;
pub mod request;
pub mod state;

pub use config::{A2aAuthConfig, A2aAuthMode, AgentCoreConfig, ObservabilityConfig};
pub use error::{ConfigError, PackError, StateError};
pub use pack::{AgentMember, Pack, PackEval, PackTool};
pub use request::{
    Action, DeploymentStatus, DestroyRequest, HealthStatus, PlanChange, PlanRequest, PlanResponse,
    ResourceHealth, StatusRequest, StatusResponse,
};
pub use state::{PriorIndex, decode_state, parse_prior_state, serialize_state};

/// Kinds of cloud resources managed by the adapter.
///
/// The serialized names are part of the state document format and must not
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    ToolGateway,
    AgentRuntime,
    #[serde(rename = "a2a_endpoint")]
    A2aEndpoint,
    Evaluator,
    /// Memory stores. Not produced by apply; accepted in state documents so
    /// destroy and status can reach them.
    Memory,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ToolGateway => "tool_gateway",
            Self::AgentRuntime => "agent_runtime",
            Self::A2aEndpoint => "a2a_endpoint",
            Self::Evaluator => "evaluator",
            Self::Memory => "memory",
        }
    }

    /// Position in apply order. Destroy walks types from highest to lowest.
    pub fn apply_rank(&self) -> u8 {
        match self {
            Self::Memory => 0,
            Self::ToolGateway => 1,
            Self::AgentRuntime => 2,
            Self::A2aEndpoint => 3,
            Self::Evaluator => 4,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded for a resource at the end of an apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    Created,
    Updated,
    Failed,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One managed resource.
///
/// `(resource_type, name)` identifies the resource across applies. `arn` is
/// empty exactly when `status` is `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    #[serde(default)]
    pub arn: String,
    pub status: ResourceStatus,
}

impl ResourceState {
    /// A resource the provider accepted.
    pub fn succeeded(
        resource_type: ResourceType,
        name: impl Into<String>,
        arn: impl Into<String>,
        status: ResourceStatus,
    ) -> Self {
        Self {
            resource_type,
            name: name.into(),
            arn: arn.into(),
            status,
        }
    }

    /// A resource whose create or update failed.
    pub fn failed(resource_type: ResourceType, name: impl Into<String>) -> Self {
        Self {
            resource_type,
            name: name.into(),
            arn: String::new(),
            status: ResourceStatus::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ResourceStatus::Failed
    }

    /// Lookup key shared by the writer and reader of state documents.
    pub fn key(&self) -> String {
        state::resource_key(self.resource_type, &self.name)
    }
}

/// The state document returned by apply and consumed by the next apply,
/// destroy and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AdapterState {
    #[serde(default)]
    pub pack_id: String,
    #[serde(default)]
    pub version: String,
    /// Phase order, then insertion order within a phase.
    #[serde(default)]
    pub resources: Vec<ResourceState>,
}

impl AdapterState {
    pub fn new(
        pack_id: impl Into<String>,
        version: impl Into<String>,
        resources: Vec<ResourceState>,
    ) -> Self {
        Self {
            pack_id: pack_id.into(),
            version: version.into(),
            resources,
        }
    }
}
