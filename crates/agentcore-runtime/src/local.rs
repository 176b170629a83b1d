//! In-memory client for local runs and tests.
//!
//! Resources live in a registry keyed by ARN. The registry can be saved to and
//! loaded from a JSON file so separate CLI invocations see the same resources.

use agentcore_core::{AgentCoreConfig, HealthStatus, ResourceState, ResourceType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;
use thiserror::Error;

use crate::adapter::{AgentCoreClient, ClientError, DeployContext};

/// Errors loading or saving a registry file.
#[derive(Debug, Error)]
pub enum LocalRegistryError {
    #[error("registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("registry is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registry lock poisoned")]
    Poisoned,
}

/// A resource held by the local registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub arn: String,
    /// Bumped on every update.
    pub generation: u32,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct LocalClient {
    registry: RwLock<BTreeMap<String, LocalResource>>,
}

fn arn_kind(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::ToolGateway => "gateway-target",
        ResourceType::AgentRuntime => "runtime",
        ResourceType::A2aEndpoint => "runtime-endpoint",
        ResourceType::Evaluator => "evaluator",
        ResourceType::Memory => "memory",
    }
}

impl LocalClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry file. A missing file yields an empty registry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LocalRegistryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let resources: Vec<LocalResource> = serde_json::from_str(&content)?;
        let registry = resources
            .into_iter()
            .map(|r| (r.arn.clone(), r))
            .collect();
        Ok(Self {
            registry: RwLock::new(registry),
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LocalRegistryError> {
        let resources = self.resources()?;
        let content = serde_json::to_string_pretty(&resources)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Snapshot of every registered resource, ordered by ARN.
    pub fn resources(&self) -> Result<Vec<LocalResource>, LocalRegistryError> {
        let registry = self
            .registry
            .read()
            .map_err(|_| LocalRegistryError::Poisoned)?;
        Ok(registry.values().cloned().collect())
    }

    pub fn get(&self, arn: &str) -> Option<LocalResource> {
        self.registry.read().ok()?.get(arn).cloned()
    }

    fn insert(
        &self,
        resource_type: ResourceType,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let arn = format!(
            "arn:aws:bedrock-agentcore:{}:{}:{}/{}-{}",
            ctx.config.region,
            ctx.config.account(),
            arn_kind(resource_type),
            name,
            &suffix[..10]
        );
        let resource = LocalResource {
            resource_type,
            name: name.to_string(),
            arn: arn.clone(),
            generation: 1,
            tags: ctx.config.tags.clone(),
        };
        self.registry
            .write()
            .map_err(|_| ClientError::api("Register", "registry lock poisoned"))?
            .insert(arn.clone(), resource);
        tracing::debug!(resource_type = %resource_type, name = %name, arn = %arn, "Registered local resource");
        Ok(arn)
    }
}

#[async_trait]
impl AgentCoreClient for LocalClient {
    async fn create_gateway_tool(
        &self,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        if !ctx.pack.tools.contains_key(name) {
            return Err(ClientError::api(
                "CreateGatewayTarget",
                format!("tool '{}' is not defined in the pack", name),
            ));
        }
        self.insert(ResourceType::ToolGateway, name, ctx)
    }

    async fn create_runtime(&self, name: &str, ctx: &DeployContext) -> Result<String, ClientError> {
        self.insert(ResourceType::AgentRuntime, name, ctx)
    }

    async fn update_runtime(
        &self,
        prior_arn: &str,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        {
            let mut registry = self
                .registry
                .write()
                .map_err(|_| ClientError::api("UpdateAgentRuntime", "registry lock poisoned"))?;
            if let Some(existing) = registry.get_mut(prior_arn) {
                existing.generation += 1;
                existing.tags = ctx.config.tags.clone();
                return Ok(existing.arn.clone());
            }
        }
        tracing::debug!(name = %name, prior_arn = %prior_arn, "Prior runtime is gone, creating a new one");
        self.insert(ResourceType::AgentRuntime, name, ctx)
    }

    async fn create_a2a_wiring(
        &self,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        let agent = name
            .strip_suffix(agentcore_core::pack::A2A_SUFFIX)
            .unwrap_or(name);
        if ctx.runtime_arn(agent).is_none() {
            return Err(ClientError::api(
                "CreateAgentRuntimeEndpoint",
                format!("runtime for agent '{}' is not deployed", agent),
            ));
        }
        self.insert(ResourceType::A2aEndpoint, name, ctx)
    }

    async fn create_evaluator(
        &self,
        name: &str,
        ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        self.insert(ResourceType::Evaluator, name, ctx)
    }

    async fn delete_resource(
        &self,
        resource: &ResourceState,
        _config: &AgentCoreConfig,
    ) -> Result<(), ClientError> {
        let removed = self
            .registry
            .write()
            .map_err(|_| ClientError::api("Delete", "registry lock poisoned"))?
            .remove(&resource.arn);
        match removed {
            Some(_) => Ok(()),
            None => Err(ClientError::NotFound(resource.arn.clone())),
        }
    }

    async fn check_resource(
        &self,
        resource: &ResourceState,
        _config: &AgentCoreConfig,
    ) -> Result<HealthStatus, ClientError> {
        let registry = self
            .registry
            .read()
            .map_err(|_| ClientError::api("Get", "registry lock poisoned"))?;
        Ok(match registry.get(&resource.arn) {
            Some(found) if found.resource_type == resource.resource_type => HealthStatus::Healthy,
            Some(_) => HealthStatus::Unhealthy,
            None => HealthStatus::Missing,
        })
    }
}
