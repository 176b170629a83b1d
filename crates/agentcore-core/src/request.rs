//! Request and response types exchanged with the deploy orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ResourceState, ResourceType};

/// Input to plan and apply.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanRequest {
    /// Pack JSON.
    pub pack_json: String,
    /// Deploy configuration JSON.
    pub deploy_config: String,
    /// State document from the previous apply. May be empty.
    #[serde(default)]
    pub prior_state: String,
}

/// Input to destroy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DestroyRequest {
    pub deploy_config: String,
    pub prior_state: String,
}

/// Input to status.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusRequest {
    pub deploy_config: String,
    pub prior_state: String,
}

/// What happens to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// One planned operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanChange {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub action: Action,
    /// ARN being updated (updates only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_arn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanResponse {
    /// Changes in apply order.
    pub changes: Vec<PlanChange>,
    /// Prior resources no longer described by the pack. Apply leaves them in
    /// place; destroying the older state document removes them.
    #[serde(default)]
    pub orphaned: Vec<ResourceState>,
    pub summary: String,
}

/// Health of a single resource as reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    Missing,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
            Self::Missing => "missing",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHealth {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub name: String,
    pub arn: String,
    pub health: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Aggregate deployment health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    Deployed,
    Degraded,
    NotDeployed,
}

impl DeploymentStatus {
    /// `NotDeployed` when nothing exists, `Deployed` when everything is
    /// healthy, `Degraded` otherwise.
    pub fn aggregate(resources: &[ResourceHealth]) -> Self {
        if resources.iter().all(|r| r.health == HealthStatus::Missing) {
            Self::NotDeployed
        } else if resources.iter().all(|r| r.health == HealthStatus::Healthy) {
            Self::Deployed
        } else {
            Self::Degraded
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deployed => "deployed",
            Self::Degraded => "degraded",
            Self::NotDeployed => "not_deployed",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: DeploymentStatus,
    pub resources: Vec<ResourceHealth>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(h: HealthStatus) -> ResourceHealth {
        ResourceHealth {
            resource_type: ResourceType::AgentRuntime,
            name: "p".to_string(),
            arn: "arn:rt:p".to_string(),
            health: h,
            detail: None,
        }
    }

    #[test]
    fn aggregate_status() {
        use HealthStatus::*;
        assert_eq!(DeploymentStatus::aggregate(&[]), DeploymentStatus::NotDeployed);
        assert_eq!(
            DeploymentStatus::aggregate(&[health(Missing), health(Missing)]),
            DeploymentStatus::NotDeployed
        );
        assert_eq!(
            DeploymentStatus::aggregate(&[health(Healthy), health(Healthy)]),
            DeploymentStatus::Deployed
        );
        assert_eq!(
            DeploymentStatus::aggregate(&[health(Healthy), health(Missing)]),
            DeploymentStatus::Degraded
        );
        assert_eq!(
            DeploymentStatus::aggregate(&[health(Unhealthy)]),
            DeploymentStatus::Degraded
        );
    }
}
