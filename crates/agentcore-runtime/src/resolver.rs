//! Create-vs-update resolution against prior state.

use agentcore_core::{Action, PriorIndex, ResourceStatus, ResourceType};

/// The operation chosen for one resource, with the labels used when
/// reporting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOp {
    pub is_update: bool,
    /// ARN of the prior resource. Set only for updates; may be empty when the
    /// prior attempt failed.
    pub prior_arn: Option<String>,
    /// Progress verb, e.g. "Creating".
    pub verb: &'static str,
    /// Verb used in failure messages, e.g. "create".
    pub fail_verb: &'static str,
    pub action: Action,
    pub terminal_status: ResourceStatus,
}

impl ResourceOp {
    pub fn create() -> Self {
        Self {
            is_update: false,
            prior_arn: None,
            verb: "Creating",
            fail_verb: "create",
            action: Action::Create,
            terminal_status: ResourceStatus::Created,
        }
    }

    pub fn update(prior_arn: impl Into<String>) -> Self {
        Self {
            is_update: true,
            prior_arn: Some(prior_arn.into()),
            verb: "Updating",
            fail_verb: "update",
            action: Action::Update,
            terminal_status: ResourceStatus::Updated,
        }
    }
}

/// Decide between create and update.
///
/// Update is chosen only when the phase can update and the prior state holds
/// an entry for `(resource_type, name)`. Failed prior entries match too.
pub fn resolve_op(
    resource_type: ResourceType,
    name: &str,
    can_update: bool,
    prior: &PriorIndex,
) -> ResourceOp {
    if !can_update {
        return ResourceOp::create();
    }
    match prior.get(resource_type, name) {
        Some(entry) => ResourceOp::update(entry.arn.clone()),
        None => ResourceOp::create(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentcore_core::{AdapterState, ResourceState};

    fn prior() -> PriorIndex {
        PriorIndex::from_state(&AdapterState::new(
            "p",
            "1",
            vec![
                ResourceState::succeeded(
                    ResourceType::AgentRuntime,
                    "p",
                    "arn:rt:p:old",
                    ResourceStatus::Created,
                ),
                ResourceState::succeeded(
                    ResourceType::ToolGateway,
                    "search",
                    "arn:tool:search",
                    ResourceStatus::Created,
                ),
                ResourceState::failed(ResourceType::AgentRuntime, "broken"),
            ],
        ))
    }

    #[test]
    fn update_when_prior_and_capability() {
        let op = resolve_op(ResourceType::AgentRuntime, "p", true, &prior());
        assert!(op.is_update);
        assert_eq!(op.prior_arn.as_deref(), Some("arn:rt:p:old"));
        assert_eq!(op.action, Action::Update);
        assert_eq!(op.terminal_status, ResourceStatus::Updated);
        assert_eq!(op.verb, "Updating");
    }

    #[test]
    fn create_without_capability_even_with_prior() {
        let op = resolve_op(ResourceType::ToolGateway, "search", false, &prior());
        assert_eq!(op, ResourceOp::create());
    }

    #[test]
    fn create_when_no_prior_entry() {
        let op = resolve_op(ResourceType::AgentRuntime, "other", true, &prior());
        assert!(!op.is_update);
        assert_eq!(op.prior_arn, None);
        assert_eq!(op.terminal_status, ResourceStatus::Created);
    }

    #[test]
    fn failed_prior_entry_still_updates() {
        let op = resolve_op(ResourceType::AgentRuntime, "broken", true, &prior());
        assert!(op.is_update);
        assert_eq!(op.prior_arn.as_deref(), Some(""));
    }

    #[test]
    fn type_is_part_of_identity() {
        let op = resolve_op(ResourceType::AgentRuntime, "search", true, &prior());
        assert!(!op.is_update);
    }
}
