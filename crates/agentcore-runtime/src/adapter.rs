//! Cloud client capability set and the per-phase create/update capabilities
//! built on top of it.

use agentcore_core::{
    AgentCoreConfig, HealthStatus, Pack, PriorIndex, ResourceState, ResourceType,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure of a single provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },
}

impl ClientError {
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Everything a provider call may need to build its request.
///
/// Carried unchanged through a phase. Between phases the engine records the
/// runtime ARNs produced so far so later phases can reference them.
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub config: AgentCoreConfig,
    pub pack: Pack,
    pub prior: PriorIndex,
    runtime_arns: BTreeMap<String, String>,
}

impl DeployContext {
    pub fn new(config: AgentCoreConfig, pack: Pack, prior: PriorIndex) -> Self {
        Self {
            config,
            pack,
            prior,
            runtime_arns: BTreeMap::new(),
        }
    }

    /// ARN of the runtime deployed for `name` earlier in this apply.
    pub fn runtime_arn(&self, name: &str) -> Option<&str> {
        self.runtime_arns.get(name).map(String::as_str)
    }

    pub(crate) fn record_runtime(&mut self, name: &str, arn: &str) {
        self.runtime_arns.insert(name.to_string(), arn.to_string());
    }
}

/// Provider operations, one per resource kind that can be created, plus the
/// optional update, delete and health check calls.
///
/// Implementations own retry and backoff. Every method may block on I/O.
#[async_trait]
pub trait AgentCoreClient: Send + Sync {
    async fn create_gateway_tool(&self, name: &str, ctx: &DeployContext)
    -> Result<String, ClientError>;

    async fn create_runtime(&self, name: &str, ctx: &DeployContext) -> Result<String, ClientError>;

    /// Update a runtime in place. `prior_arn` may be empty or refer to a
    /// resource that no longer exists; the implementation decides how to
    /// recover.
    async fn update_runtime(
        &self,
        prior_arn: &str,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError>;

    async fn create_a2a_wiring(&self, name: &str, ctx: &DeployContext)
    -> Result<String, ClientError>;

    async fn create_evaluator(&self, name: &str, ctx: &DeployContext) -> Result<String, ClientError>;

    /// Delete a resource. Returning `NotFound` counts as success.
    async fn delete_resource(
        &self,
        resource: &ResourceState,
        _config: &AgentCoreConfig,
    ) -> Result<(), ClientError> {
        Err(ClientError::Unsupported(format!(
            "delete {}",
            resource.resource_type
        )))
    }

    async fn check_resource(
        &self,
        resource: &ResourceState,
        _config: &AgentCoreConfig,
    ) -> Result<HealthStatus, ClientError> {
        Err(ClientError::Unsupported(format!(
            "check {}",
            resource.resource_type
        )))
    }
}

/// Creates one kind of resource.
#[async_trait]
pub trait CreateResource: Send + Sync {
    async fn create(&self, name: &str, ctx: &DeployContext) -> Result<String, ClientError>;
}

/// Updates one kind of resource in place.
#[async_trait]
pub trait UpdateResource: Send + Sync {
    async fn update(
        &self,
        prior_arn: &str,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError>;
}

/// Create capability for `resource_type`, backed by a client.
pub struct Creator<'a, C: ?Sized> {
    client: &'a C,
    resource_type: ResourceType,
}

impl<'a, C: AgentCoreClient + ?Sized> Creator<'a, C> {
    pub fn new(client: &'a C, resource_type: ResourceType) -> Self {
        Self {
            client,
            resource_type,
        }
    }
}

#[async_trait]
impl<C: AgentCoreClient + ?Sized> CreateResource for Creator<'_, C> {
    async fn create(&self, name: &str, ctx: &DeployContext) -> Result<String, ClientError> {
        match self.resource_type {
            ResourceType::ToolGateway => self.client.create_gateway_tool(name, ctx).await,
            ResourceType::AgentRuntime => self.client.create_runtime(name, ctx).await,
            ResourceType::A2aEndpoint => self.client.create_a2a_wiring(name, ctx).await,
            ResourceType::Evaluator => self.client.create_evaluator(name, ctx).await,
            ResourceType::Memory => Err(ClientError::Unsupported("create memory".to_string())),
        }
    }
}

/// Update capability for `resource_type`, backed by a client. Only runtimes
/// have a provider update call.
pub struct Updater<'a, C: ?Sized> {
    client: &'a C,
    resource_type: ResourceType,
}

impl<'a, C: AgentCoreClient + ?Sized> Updater<'a, C> {
    pub fn new(client: &'a C, resource_type: ResourceType) -> Self {
        Self {
            client,
            resource_type,
        }
    }
}

#[async_trait]
impl<C: AgentCoreClient + ?Sized> UpdateResource for Updater<'_, C> {
    async fn update(
        &self,
        prior_arn: &str,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        match self.resource_type {
            ResourceType::AgentRuntime => self.client.update_runtime(prior_arn, name, ctx).await,
            other => Err(ClientError::Unsupported(format!("update {}", other))),
        }
    }
}
