//! The apply engine: plan, apply, destroy and status over one client.
//!
//! Apply runs four phases in a fixed order:
//!
//! | # | Phase | Names | Update |
//! |---|-------|-------|--------|
//! | 0 | tool gateway entries | sorted tool names | no |
//! | 1 | agent runtimes | agent members, or the pack id | yes |
//! | 2 | A2A wiring | `{agent}_a2a`, multi-agent packs only | no |
//! | 3 | evaluators | eval id or `eval_{index}` | no |
//!
//! Resources removed from the pack between applies are not deleted by apply.
//! They drop out of the new state document and are reported as orphaned by
//! plan; destroying the older state document removes them.

use agentcore_core::{
    Action, AdapterState, AgentCoreConfig, DeploymentStatus, DestroyRequest, HealthStatus, Pack,
    PlanChange, PlanRequest, PlanResponse, PriorIndex, ResourceHealth, ResourceState,
    ResourceType, StatusRequest, StatusResponse, decode_state, parse_prior_state, serialize_state,
};
use std::cmp::Reverse;
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

use crate::adapter::{AgentCoreClient, ClientError, Creator, DeployContext, UpdateResource, Updater};
use crate::error::{ApplyErrors, DeployError, ResourceFailure};
use crate::phase::{Phase, cancellable, run_phase};
use crate::reporter::{ApplyCallback, ProgressReporter, ResourceResult, ResultStatus};
use crate::resolver::resolve_op;

/// Result of an apply that ran to completion.
///
/// `state` is always present and must be persisted, even when `error` is set:
/// it is the only way destroy can reach the resources that were created.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub state: String,
    pub error: Option<ApplyErrors>,
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct DestroyOutcome {
    pub deleted: Vec<ResourceState>,
    /// Entries that never got an ARN and so had nothing to delete.
    pub skipped: Vec<ResourceState>,
}

/// One scheduled phase.
struct PhasePlan {
    resource_type: ResourceType,
    names: Vec<String>,
    updatable: bool,
}

/// The phase schedule. `updatable` is the only place that decides which
/// resource types are updated in place rather than recreated.
fn schedule(pack: &Pack) -> [PhasePlan; 4] {
    [
        PhasePlan {
            resource_type: ResourceType::ToolGateway,
            names: pack.tool_names(),
            updatable: false,
        },
        PhasePlan {
            resource_type: ResourceType::AgentRuntime,
            names: pack.runtime_names(),
            updatable: true,
        },
        PhasePlan {
            resource_type: ResourceType::A2aEndpoint,
            names: pack.a2a_names(),
            updatable: false,
        },
        PhasePlan {
            resource_type: ResourceType::Evaluator,
            names: pack.eval_names(),
            updatable: false,
        },
    ]
}

/// Prior resources the schedule no longer describes, in apply order.
fn orphaned(prior: &PriorIndex, phases: &[PhasePlan]) -> Vec<ResourceState> {
    let desired: HashSet<(ResourceType, &str)> = phases
        .iter()
        .flat_map(|p| p.names.iter().map(move |n| (p.resource_type, n.as_str())))
        .collect();
    let mut stale: Vec<ResourceState> = prior
        .iter()
        .filter(|r| !desired.contains(&(r.resource_type, r.name.as_str())))
        .cloned()
        .collect();
    stale.sort_by(|a, b| {
        (a.resource_type.apply_rank(), &a.name).cmp(&(b.resource_type.apply_rank(), &b.name))
    });
    stale
}

pub struct ApplyEngine<C: AgentCoreClient> {
    client: C,
}

impl<C: AgentCoreClient> ApplyEngine<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Parse the pack, config and prior state of a request.
    fn prepare(&self, request: &PlanRequest) -> Result<DeployContext, DeployError> {
        let pack = Pack::parse(&request.pack_json)?;
        let config = AgentCoreConfig::parse(&request.deploy_config)?;
        let prior = parse_prior_state(&request.prior_state);
        Ok(DeployContext::new(config, pack, prior))
    }

    /// Describe what apply would do, without calling the provider.
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, DeployError> {
        let ctx = self.prepare(request)?;
        let phases = schedule(&ctx.pack);

        let mut changes = Vec::new();
        for phase in &phases {
            for name in &phase.names {
                let op = resolve_op(phase.resource_type, name, phase.updatable, &ctx.prior);
                changes.push(PlanChange {
                    resource_type: phase.resource_type,
                    name: name.clone(),
                    action: op.action,
                    prior_arn: op.prior_arn,
                });
            }
        }

        let orphaned = orphaned(&ctx.prior, &phases);
        let creates = changes.iter().filter(|c| c.action == Action::Create).count();
        let updates = changes.iter().filter(|c| c.action == Action::Update).count();
        let summary = format!(
            "{} to create, {} to update, {} orphaned",
            creates,
            updates,
            orphaned.len()
        );

        Ok(PlanResponse {
            changes,
            orphaned,
            summary,
        })
    }

    /// Reconcile the pack against the prior state.
    ///
    /// Per-resource failures do not stop the run; they are recorded as failed
    /// entries and returned in [`ApplyOutcome::error`]. A callback error stops
    /// the run immediately and no state is produced. It comes back wrapped in
    /// [`DeployError::Callback`]; use [`DeployError::into_callback_error`] to
    /// get the callback's own error.
    pub async fn apply(
        &self,
        request: &PlanRequest,
        callback: &mut dyn ApplyCallback,
        cancel: &CancellationToken,
    ) -> Result<ApplyOutcome, DeployError> {
        let mut ctx = self.prepare(request)?;
        let phases = schedule(&ctx.pack);

        for stale in orphaned(&ctx.prior, &phases) {
            tracing::warn!(
                resource_type = %stale.resource_type,
                name = %stale.name,
                arn = %stale.arn,
                "Prior resource is no longer in the pack and will be left in place"
            );
        }

        tracing::info!(
            pack_id = %ctx.pack.id,
            version = %ctx.pack.version,
            prior_resources = ctx.prior.len(),
            "Applying pack"
        );

        let mut reporter = ProgressReporter::new(callback);
        let mut resources = Vec::new();
        let mut errors = ApplyErrors::new();

        for (index, plan) in phases.iter().enumerate() {
            if plan.names.is_empty() {
                tracing::debug!(resource_type = %plan.resource_type, "Nothing to apply, skipping phase");
                continue;
            }

            let create = Creator::new(&self.client, plan.resource_type);
            let updater = Updater::new(&self.client, plan.resource_type);
            let update = plan.updatable.then_some(&updater as &dyn UpdateResource);

            let result = run_phase(
                Phase {
                    index,
                    resource_type: plan.resource_type,
                    names: &plan.names,
                    create: &create,
                    update,
                },
                &ctx,
                &mut reporter,
                cancel,
            )
            .await;

            if let Some(e) = result.callback_err {
                tracing::warn!(error = %e, "Apply cancelled by callback, discarding state");
                return Err(DeployError::Callback(e));
            }

            if plan.resource_type == ResourceType::AgentRuntime {
                for runtime in result.resources.iter().filter(|r| !r.is_failed()) {
                    ctx.record_runtime(&runtime.name, &runtime.arn);
                }
            }

            resources.extend(result.resources);
            errors.extend(result.errors);
        }

        let state = AdapterState::new(ctx.pack.id.clone(), ctx.pack.version.clone(), resources);
        let failed = state.resources.iter().filter(|r| r.is_failed()).count();
        let encoded = serialize_state(&state)?;

        tracing::info!(
            pack_id = %state.pack_id,
            resources = state.resources.len(),
            failed,
            "Apply finished"
        );

        Ok(ApplyOutcome {
            state: encoded,
            error: errors.into_option(),
        })
    }

    /// Tear down every resource recorded in a state document, newest phase
    /// first.
    ///
    /// Failed deletions are collected and the run goes on. Any callback error,
    /// including one returned for an `Error` event, stops it at once.
    pub async fn destroy(
        &self,
        request: &DestroyRequest,
        callback: &mut dyn ApplyCallback,
        cancel: &CancellationToken,
    ) -> Result<DestroyOutcome, DeployError> {
        let config = AgentCoreConfig::parse(&request.deploy_config)?;
        let Some(state) = decode_state(&request.prior_state)? else {
            tracing::info!("No prior state, nothing to destroy");
            return Ok(DestroyOutcome::default());
        };

        let mut order: Vec<(usize, &ResourceState)> = state.resources.iter().enumerate().collect();
        order.sort_by_key(|(i, r)| (Reverse(r.resource_type.apply_rank()), Reverse(*i)));

        tracing::info!(pack_id = %state.pack_id, resources = order.len(), "Destroying deployment");

        let mut reporter = ProgressReporter::new(callback);
        let mut outcome = DestroyOutcome::default();
        let mut errors = ApplyErrors::new();
        let total = order.len();

        for (position, (_, resource)) in order.into_iter().enumerate() {
            let fraction = position as f64 / total as f64;

            if resource.arn.is_empty() {
                tracing::debug!(
                    resource_type = %resource.resource_type,
                    name = %resource.name,
                    "Skipping resource that was never created"
                );
                reporter
                    .progress(
                        format!(
                            "Skipping {}: {} (never created)",
                            resource.resource_type, resource.name
                        ),
                        fraction,
                    )
                    .map_err(DeployError::Callback)?;
                outcome.skipped.push(resource.clone());
                continue;
            }

            reporter
                .progress(
                    format!("Deleting {}: {}", resource.resource_type, resource.name),
                    fraction,
                )
                .map_err(DeployError::Callback)?;

            match cancellable(cancel, self.client.delete_resource(resource, &config)).await {
                Ok(()) | Err(ClientError::NotFound(_)) => {
                    reporter
                        .resource(ResourceResult {
                            resource_type: resource.resource_type,
                            name: resource.name.clone(),
                            action: Action::Delete,
                            status: ResultStatus::Deleted,
                            detail: resource.arn.clone(),
                        })
                        .map_err(DeployError::Callback)?;
                    outcome.deleted.push(resource.clone());
                }
                Err(source) => {
                    tracing::warn!(
                        resource_type = %resource.resource_type,
                        name = %resource.name,
                        error = %source,
                        "Failed to delete resource"
                    );
                    reporter
                        .error(resource.resource_type, &resource.name, &source)
                        .map_err(DeployError::Callback)?;
                    errors.push(ResourceFailure {
                        resource_type: resource.resource_type,
                        name: resource.name.clone(),
                        action: Action::Delete,
                        source,
                    });
                }
            }
        }

        tracing::info!(
            deleted = outcome.deleted.len(),
            skipped = outcome.skipped.len(),
            failed = errors.len(),
            "Destroy finished"
        );

        match errors.into_option() {
            Some(errors) => Err(DeployError::Resources(errors)),
            None => Ok(outcome),
        }
    }

    /// Report provider health for every resource in a state document.
    pub async fn status(&self, request: &StatusRequest) -> Result<StatusResponse, DeployError> {
        let config = AgentCoreConfig::parse(&request.deploy_config)?;
        let resources = match decode_state(&request.prior_state)? {
            Some(state) => state.resources,
            None => Vec::new(),
        };

        let mut report = Vec::with_capacity(resources.len());
        for resource in resources {
            let (health, detail) = if resource.arn.is_empty() {
                (HealthStatus::Missing, Some("never created".to_string()))
            } else {
                match self.client.check_resource(&resource, &config).await {
                    Ok(health) => (health, None),
                    Err(ClientError::NotFound(_)) => (HealthStatus::Missing, None),
                    Err(e) => (HealthStatus::Unhealthy, Some(e.to_string())),
                }
            };
            report.push(ResourceHealth {
                resource_type: resource.resource_type,
                name: resource.name,
                arn: resource.arn,
                health,
                detail,
            });
        }

        let status = DeploymentStatus::aggregate(&report);
        tracing::debug!(status = %status, resources = report.len(), "Status checked");
        Ok(StatusResponse {
            status,
            resources: report,
        })
    }
}
