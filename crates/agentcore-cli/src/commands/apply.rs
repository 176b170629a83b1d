//! `agentcore apply` - create or update the resources a pack needs.

use agentcore_core::PlanRequest;
use agentcore_runtime::ApplyEngine;
use anyhow::Context;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::{
    ConsolePrinter, cancel_on_interrupt, open_registry, read_deploy_config, read_state,
    retain_superseded, save_registry, write_state,
};

pub async fn run(pack: &Path, config: &Path, state: &Path, registry: &Path) -> anyhow::Result<()> {
    let request = PlanRequest {
        pack_json: fs::read_to_string(pack)
            .with_context(|| format!("failed to read pack {}", pack.display()))?,
        deploy_config: read_deploy_config(config)?,
        prior_state: read_state(state)?,
    };

    let engine = ApplyEngine::new(open_registry(registry)?);
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(&cancel);
    let mut printer = ConsolePrinter::stdout();

    let result = engine.apply(&request, &mut printer, &cancel).await;
    interrupt.abort();

    // Whatever the provider now holds must be visible to the next run.
    save_registry(engine.client(), registry)?;
    let outcome = result?;

    // Recreated and dropped resources stay reachable for destroy.
    retain_superseded(state, &request.prior_state, &outcome.state)?;
    write_state(state, &outcome.state)?;
    tracing::info!(state = %state.display(), "State written");

    match outcome.error {
        Some(errors) => Err(anyhow::Error::new(errors)
            .context(format!("apply finished with failures (state saved to {})", state.display()))),
        None => {
            println!("Apply complete.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{superseded_path, testing};
    use agentcore_core::{ResourceStatus, ResourceType, decode_state};
    use agentcore_runtime::LocalClient;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_state_and_registry() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());

        run(&ws.pack, &ws.config, &ws.state, &ws.registry).await.unwrap();

        let state = decode_state(&fs::read_to_string(&ws.state).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(state.pack_id, "support");
        assert_eq!(state.resources.len(), 6);
        assert!(state.resources.iter().all(|r| r.status == ResourceStatus::Created));

        let registry = LocalClient::load(&ws.registry).unwrap();
        assert_eq!(registry.resources().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn second_apply_updates_runtimes() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());

        run(&ws.pack, &ws.config, &ws.state, &ws.registry).await.unwrap();
        run(&ws.pack, &ws.config, &ws.state, &ws.registry).await.unwrap();

        let state = decode_state(&fs::read_to_string(&ws.state).unwrap())
            .unwrap()
            .unwrap();
        let updated = state
            .resources
            .iter()
            .filter(|r| r.status == ResourceStatus::Updated)
            .count();
        assert_eq!(updated, 2);

        // The first apply's tool, wiring and evaluator were recreated.
        let superseded = decode_state(&fs::read_to_string(superseded_path(&ws.state)).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(superseded.resources.len(), 4);
        assert!(
            superseded
                .resources
                .iter()
                .all(|r| r.resource_type != ResourceType::AgentRuntime)
        );
    }

    #[tokio::test]
    async fn first_apply_leaves_no_superseded_document() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());

        run(&ws.pack, &ws.config, &ws.state, &ws.registry).await.unwrap();
        assert!(!superseded_path(&ws.state).exists());
    }

    #[tokio::test]
    async fn bad_config_writes_nothing() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());
        fs::write(&ws.config, "region: nowhere\n").unwrap();

        assert!(run(&ws.pack, &ws.config, &ws.state, &ws.registry).await.is_err());
        assert!(!ws.state.exists());
    }
}
