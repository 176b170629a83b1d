//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use agentcore_core::{
    AgentCoreConfig, HealthStatus, PlanRequest, ResourceState, ResourceType,
};
use agentcore_runtime::{AgentCoreClient, ApplyCallback, ApplyEvent, ClientError, DeployContext};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const CONFIG: &str = r#"{
    "region": "us-west-2",
    "runtime_role_arn": "arn:aws:iam::123456789012:role/AgentRuntime"
}"#;

pub fn request(pack_json: &str, prior_state: &str) -> PlanRequest {
    PlanRequest {
        pack_json: pack_json.to_string(),
        deploy_config: CONFIG.to_string(),
        prior_state: prior_state.to_string(),
    }
}

/// A provider call seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(ResourceType, String),
    Update { name: String, prior_arn: String },
    Delete(ResourceType, String),
    Check(ResourceType, String),
}

/// Scripted client: deterministic ARNs, configurable failures, call log.
#[derive(Default)]
pub struct MockClient {
    pub calls: Mutex<Vec<Call>>,
    fail_create: HashSet<(ResourceType, String)>,
    fail_delete: HashSet<String>,
    missing: HashSet<String>,
    health: HashMap<String, Result<HealthStatus, ClientError>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(mut self, resource_type: ResourceType, name: &str) -> Self {
        self.fail_create.insert((resource_type, name.to_string()));
        self
    }

    /// Delete of this name fails with an API error.
    pub fn fail_delete(mut self, name: &str) -> Self {
        self.fail_delete.insert(name.to_string());
        self
    }

    /// Delete of this name reports the resource as already gone.
    pub fn already_deleted(mut self, name: &str) -> Self {
        self.missing.insert(name.to_string());
        self
    }

    pub fn health(mut self, name: &str, result: Result<HealthStatus, ClientError>) -> Self {
        self.health.insert(name.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn arn_prefix(resource_type: ResourceType) -> &'static str {
        match resource_type {
            ResourceType::ToolGateway => "arn:tool",
            ResourceType::AgentRuntime => "arn:rt",
            ResourceType::A2aEndpoint => "arn:a2a",
            ResourceType::Evaluator => "arn:eval",
            ResourceType::Memory => "arn:mem",
        }
    }

    fn create(&self, resource_type: ResourceType, name: &str) -> Result<String, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(resource_type, name.to_string()));
        if self.fail_create.contains(&(resource_type, name.to_string())) {
            return Err(ClientError::api("Create", format!("{} rejected", name)));
        }
        Ok(format!("{}:{}", Self::arn_prefix(resource_type), name))
    }
}

#[async_trait]
impl AgentCoreClient for MockClient {
    async fn create_gateway_tool(
        &self,
        name: &str,
        _ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        self.create(ResourceType::ToolGateway, name)
    }

    async fn create_runtime(&self, name: &str, _ctx: &DeployContext) -> Result<String, ClientError> {
        self.create(ResourceType::AgentRuntime, name)
    }

    async fn update_runtime(
        &self,
        prior_arn: &str,
        name: &str,
        _ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        self.calls.lock().unwrap().push(Call::Update {
            name: name.to_string(),
            prior_arn: prior_arn.to_string(),
        });
        if prior_arn.is_empty() {
            return Ok(format!("arn:rt:{}", name));
        }
        Ok(prior_arn.to_string())
    }

    async fn create_a2a_wiring(
        &self,
        name: &str,
        _ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        self.create(ResourceType::A2aEndpoint, name)
    }

    async fn create_evaluator(
        &self,
        name: &str,
        _ctx: &DeployContext,
    ) -> Result<String, ClientError> {
        self.create(ResourceType::Evaluator, name)
    }

    async fn delete_resource(
        &self,
        resource: &ResourceState,
        _config: &AgentCoreConfig,
    ) -> Result<(), ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(resource.resource_type, resource.name.clone()));
        if self.fail_delete.contains(&resource.name) {
            return Err(ClientError::api("Delete", "access denied"));
        }
        if self.missing.contains(&resource.name) {
            return Err(ClientError::NotFound(resource.arn.clone()));
        }
        Ok(())
    }

    async fn check_resource(
        &self,
        resource: &ResourceState,
        _config: &AgentCoreConfig,
    ) -> Result<HealthStatus, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Check(resource.resource_type, resource.name.clone()));
        self.health
            .get(&resource.name)
            .cloned()
            .unwrap_or(Ok(HealthStatus::Healthy))
    }
}

/// Callback that records every event and can refuse the Nth resource event.
#[derive(Default)]
pub struct RecordingCallback {
    pub events: Vec<ApplyEvent>,
    fail_on_resource: Option<usize>,
    fail_on_error: bool,
    resource_events: usize,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return an error from the `n`-th (1-based) resource event.
    pub fn failing_on_resource(n: usize) -> Self {
        Self {
            fail_on_resource: Some(n),
            ..Default::default()
        }
    }

    /// Return an error from every error event.
    pub fn failing_on_error() -> Self {
        Self {
            fail_on_error: true,
            ..Default::default()
        }
    }

    pub fn fractions(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ApplyEvent::Progress { fraction, .. } => Some(*fraction),
                _ => None,
            })
            .collect()
    }

    pub fn progress_messages(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ApplyEvent::Progress { message, .. } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count_errors(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ApplyEvent::Error { .. }))
            .count()
    }
}

impl ApplyCallback for RecordingCallback {
    fn on_event(&mut self, event: &ApplyEvent) -> anyhow::Result<()> {
        self.events.push(event.clone());
        if self.fail_on_error && matches!(event, ApplyEvent::Error { .. }) {
            anyhow::bail!("stopped by caller on error");
        }
        if let ApplyEvent::Resource(_) = event {
            self.resource_events += 1;
            if Some(self.resource_events) == self.fail_on_resource {
                anyhow::bail!("stopped by caller after {} resources", self.resource_events);
            }
        }
        Ok(())
    }
}
