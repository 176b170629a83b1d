//! `agentcore destroy` - delete everything a state document records.

use agentcore_core::DestroyRequest;
use agentcore_runtime::{ApplyEngine, DestroyOutcome, LocalClient};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tokio_util::sync::CancellationToken;

use super::{
    ConsolePrinter, cancel_on_interrupt, open_registry, read_deploy_config, read_state,
    save_registry, superseded_path,
};

pub async fn run(config: &Path, state: &Path, registry: &Path) -> anyhow::Result<()> {
    let deploy_config = read_deploy_config(config)?;
    let engine = ApplyEngine::new(open_registry(registry)?);
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(&cancel);
    let mut printer = ConsolePrinter::stdout();

    let mut deleted = 0;
    let mut skipped = 0;
    let mut result = Ok(());
    // Current deployment first, then whatever earlier applies replaced.
    for document in [state.to_path_buf(), superseded_path(state)] {
        match destroy_document(&engine, &deploy_config, &document, &mut printer, &cancel).await {
            Ok(outcome) => {
                deleted += outcome.deleted.len();
                skipped += outcome.skipped.len();
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    interrupt.abort();

    save_registry(engine.client(), registry)?;
    result?;

    println!("Destroy complete: {} deleted, {} skipped.", deleted, skipped);
    Ok(())
}

/// Destroy one state document and remove it. On failure the file stays so
/// destroy can be retried.
async fn destroy_document(
    engine: &ApplyEngine<LocalClient>,
    deploy_config: &str,
    document: &Path,
    printer: &mut ConsolePrinter<std::io::Stdout>,
    cancel: &CancellationToken,
) -> anyhow::Result<DestroyOutcome> {
    let request = DestroyRequest {
        deploy_config: deploy_config.to_string(),
        prior_state: read_state(document)?,
    };
    let outcome = engine
        .destroy(&request, printer, cancel)
        .await
        .with_context(|| format!("failed to destroy {}", document.display()))?;

    if document.exists() {
        fs::remove_file(document)
            .with_context(|| format!("failed to remove state {}", document.display()))?;
    }
    Ok(outcome)
}
