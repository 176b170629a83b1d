//! `agentcore status` - report the health of a deployment.

use agentcore_core::StatusRequest;
use agentcore_runtime::ApplyEngine;
use std::path::Path;

use super::{open_registry, read_deploy_config, read_state};

pub async fn run(config: &Path, state: &Path, registry: &Path, json: bool) -> anyhow::Result<()> {
    let request = StatusRequest {
        deploy_config: read_deploy_config(config)?,
        prior_state: read_state(state)?,
    };

    let engine = ApplyEngine::new(open_registry(registry)?);
    let response = engine.status(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    for resource in &response.resources {
        print!(
            "{:<14} {:<24} {:<10}",
            resource.resource_type.as_str(),
            resource.name,
            resource.health.to_string()
        );
        match &resource.detail {
            Some(detail) => println!(" {}", detail),
            None => println!(" {}", resource.arn),
        }
    }
    println!("Deployment: {}", response.status);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{apply, testing};
    use tempfile::tempdir;

    #[tokio::test]
    async fn status_before_and_after_apply() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());

        run(&ws.config, &ws.state, &ws.registry, false).await.unwrap();

        apply::run(&ws.pack, &ws.config, &ws.state, &ws.registry)
            .await
            .unwrap();
        run(&ws.config, &ws.state, &ws.registry, true).await.unwrap();
    }
}
