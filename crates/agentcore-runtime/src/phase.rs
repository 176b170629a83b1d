//! Execution of a single phase: one resource type over an ordered name list.

use agentcore_core::{ResourceState, ResourceType};
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::adapter::{ClientError, CreateResource, DeployContext, UpdateResource};
use crate::error::{ApplyErrors, ResourceFailure};
use crate::reporter::{ProgressReporter, ResourceResult, ResultStatus};
use crate::resolver::{ResourceOp, resolve_op};

/// Number of phases in an apply; each owns an equal slice of progress.
pub const PHASE_COUNT: usize = 4;

/// Progress share of one phase.
pub const PHASE_WEIGHT: f64 = 1.0 / PHASE_COUNT as f64;

/// One phase to run.
pub struct Phase<'a> {
    /// Position in the apply schedule; fixes the progress quarter.
    pub index: usize,
    pub resource_type: ResourceType,
    pub names: &'a [String],
    pub create: &'a dyn CreateResource,
    /// `None` for phases that always recreate.
    pub update: Option<&'a dyn UpdateResource>,
}

/// What a phase produced.
#[derive(Debug, Default)]
pub struct PhaseResult {
    /// Resources in processing order, including failures.
    pub resources: Vec<ResourceState>,
    pub errors: ApplyErrors,
    /// Set when the callback stopped the phase.
    pub callback_err: Option<anyhow::Error>,
}

/// Progress fraction for the `position`-th of `total` resources in phase
/// `index`. Stays strictly below the next phase's base.
pub fn phase_fraction(index: usize, position: usize, total: usize) -> f64 {
    let base = index as f64 * PHASE_WEIGHT;
    base + (position as f64 / (total as f64 + 1.0)) * PHASE_WEIGHT
}

/// Run `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    if cancel.is_cancelled() {
        return Err(ClientError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = fut => result,
    }
}

/// Run one phase.
///
/// A failed resource is recorded and the phase moves on. A callback error
/// stops the phase at once.
pub async fn run_phase(
    phase: Phase<'_>,
    ctx: &DeployContext,
    reporter: &mut ProgressReporter<'_>,
    cancel: &CancellationToken,
) -> PhaseResult {
    let mut result = PhaseResult::default();
    let total = phase.names.len();

    tracing::info!(
        resource_type = %phase.resource_type,
        count = total,
        "Starting phase {}",
        phase.index
    );

    for (position, name) in phase.names.iter().enumerate() {
        let fraction = phase_fraction(phase.index, position, total);
        let op = resolve_op(
            phase.resource_type,
            name,
            phase.update.is_some(),
            &ctx.prior,
        );
        tracing::debug!(
            resource_type = %phase.resource_type,
            name = %name,
            action = %op.action,
            "Resolved operation"
        );

        if let Err(e) = reporter.progress(
            format!("{} {}: {}", op.verb, phase.resource_type, name),
            fraction,
        ) {
            result.callback_err = Some(e);
            return result;
        }

        let outcome = cancellable(cancel, invoke(&phase, &op, name, ctx))
            .await
            .and_then(|arn| {
                if arn.is_empty() {
                    Err(ClientError::api(op.fail_verb, "provider returned an empty ARN"))
                } else {
                    Ok(arn)
                }
            });

        match outcome {
            Err(source) => {
                tracing::warn!(
                    resource_type = %phase.resource_type,
                    name = %name,
                    error = %source,
                    "Failed to {} resource",
                    op.fail_verb
                );
                // Already failing; the callback's verdict does not change that.
                let _ = reporter.error(phase.resource_type, name, &source);
                result
                    .resources
                    .push(ResourceState::failed(phase.resource_type, name.as_str()));
                result.errors.push(ResourceFailure {
                    resource_type: phase.resource_type,
                    name: name.clone(),
                    action: op.action,
                    source,
                });
            }
            Ok(arn) => {
                tracing::info!(
                    resource_type = %phase.resource_type,
                    name = %name,
                    arn = %arn,
                    status = %op.terminal_status,
                    "Resource ready"
                );
                let status = ResultStatus::from_resource_status(op.terminal_status)
                    .unwrap_or(ResultStatus::Created);
                if let Err(e) = reporter.resource(ResourceResult {
                    resource_type: phase.resource_type,
                    name: name.clone(),
                    action: op.action,
                    status,
                    detail: arn.clone(),
                }) {
                    result.callback_err = Some(e);
                    return result;
                }
                result.resources.push(ResourceState::succeeded(
                    phase.resource_type,
                    name.as_str(),
                    arn,
                    op.terminal_status,
                ));
            }
        }
    }

    result
}

async fn invoke(
    phase: &Phase<'_>,
    op: &ResourceOp,
    name: &str,
    ctx: &DeployContext,
) -> Result<String, ClientError> {
    match (phase.update, op.prior_arn.as_deref()) {
        (Some(update), Some(prior_arn)) if op.is_update => {
            update.update(prior_arn, name, ctx).await
        }
        _ => phase.create.create(name, ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::ApplyEvent;
    use agentcore_core::{
        AdapterState, AgentCoreConfig, Pack, PriorIndex, ResourceStatus,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Scripted {
        fail: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(fail: Vec<&'static str>) -> Self {
            Self {
                fail,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CreateResource for Scripted {
        async fn create(&self, name: &str, _ctx: &DeployContext) -> Result<String, ClientError> {
            self.calls.lock().unwrap().push(format!("create:{}", name));
            if self.fail.contains(&name) {
                return Err(ClientError::api("Create", "boom"));
            }
            Ok(format!("arn:new:{}", name))
        }
    }

    #[async_trait]
    impl UpdateResource for Scripted {
        async fn update(
            &self,
            prior_arn: &str,
            name: &str,
            _ctx: &DeployContext,
        ) -> Result<String, ClientError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("update:{}:{}", name, prior_arn));
            Ok(prior_arn.to_string())
        }
    }

    fn ctx(prior: PriorIndex) -> DeployContext {
        let config = AgentCoreConfig::parse(
            r#"{ "region": "us-west-2", "runtime_role_arn": "arn:aws:iam::123456789012:role/R" }"#,
        )
        .unwrap();
        DeployContext::new(config, Pack::default(), prior)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fractions_stay_inside_their_quarter() {
        assert_eq!(phase_fraction(0, 0, 3), 0.0);
        assert_eq!(phase_fraction(2, 0, 1), 0.5);
        let last = phase_fraction(1, 2, 3);
        assert!(last > phase_fraction(1, 1, 3));
        assert!(last < 0.5);
    }

    #[tokio::test]
    async fn failure_does_not_stop_the_phase() {
        let client = Scripted::new(vec!["b"]);
        let list = names(&["a", "b", "c"]);
        let mut events = Vec::new();
        let mut callback = |e: &ApplyEvent| -> anyhow::Result<()> {
            events.push(e.clone());
            Ok(())
        };
        let mut reporter = ProgressReporter::new(&mut callback);

        let result = run_phase(
            Phase {
                index: 3,
                resource_type: ResourceType::Evaluator,
                names: &list,
                create: &client,
                update: None,
            },
            &ctx(PriorIndex::default()),
            &mut reporter,
            &CancellationToken::new(),
        )
        .await;
        drop(reporter);

        assert!(result.callback_err.is_none());
        assert_eq!(result.resources.len(), 3);
        assert_eq!(result.resources[1], ResourceState::failed(ResourceType::Evaluator, "b"));
        assert_eq!(result.resources[2].arn, "arn:new:c");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors.first().unwrap().name, "b");

        // progress, resource, progress, error, progress, resource
        assert_eq!(events.len(), 6);
        assert!(matches!(events[3], ApplyEvent::Error { .. }));
    }

    #[tokio::test]
    async fn update_uses_prior_arn() {
        let prior = PriorIndex::from_state(&AdapterState::new(
            "p",
            "1",
            vec![ResourceState::succeeded(
                ResourceType::AgentRuntime,
                "p",
                "arn:rt:p:old",
                ResourceStatus::Created,
            )],
        ));
        let client = Scripted::new(vec![]);
        let list = names(&["p", "q"]);
        let mut callback = |_: &ApplyEvent| -> anyhow::Result<()> { Ok(()) };
        let mut reporter = ProgressReporter::new(&mut callback);

        let result = run_phase(
            Phase {
                index: 1,
                resource_type: ResourceType::AgentRuntime,
                names: &list,
                create: &client,
                update: Some(&client),
            },
            &ctx(prior),
            &mut reporter,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(
            *client.calls.lock().unwrap(),
            vec!["update:p:arn:rt:p:old".to_string(), "create:q".to_string()]
        );
        assert_eq!(result.resources[0].status, ResourceStatus::Updated);
        assert_eq!(result.resources[1].status, ResourceStatus::Created);
    }

    #[tokio::test]
    async fn callback_error_on_start_stops_before_invoking() {
        let client = Scripted::new(vec![]);
        let list = names(&["a", "b"]);
        let mut callback = |_: &ApplyEvent| -> anyhow::Result<()> { Err(anyhow::anyhow!("halt")) };
        let mut reporter = ProgressReporter::new(&mut callback);

        let result = run_phase(
            Phase {
                index: 0,
                resource_type: ResourceType::ToolGateway,
                names: &list,
                create: &client,
                update: None,
            },
            &ctx(PriorIndex::default()),
            &mut reporter,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(result.callback_err.unwrap().to_string(), "halt");
        assert!(result.resources.is_empty());
        assert!(client.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn caller_cancellation_records_failures_and_continues() {
        let client = Scripted::new(vec![]);
        let list = names(&["a", "b"]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut callback = |_: &ApplyEvent| -> anyhow::Result<()> { Ok(()) };
        let mut reporter = ProgressReporter::new(&mut callback);

        let result = run_phase(
            Phase {
                index: 0,
                resource_type: ResourceType::ToolGateway,
                names: &list,
                create: &client,
                update: None,
            },
            &ctx(PriorIndex::default()),
            &mut reporter,
            &cancel,
        )
        .await;

        assert!(result.callback_err.is_none());
        assert_eq!(result.resources.len(), 2);
        assert!(result.resources.iter().all(ResourceState::is_failed));
        assert!(
            result
                .errors
                .iter()
                .all(|f| f.source == ClientError::Cancelled)
        );
    }
}
