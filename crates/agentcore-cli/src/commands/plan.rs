//! `agentcore plan` - preview the changes apply would make.

use agentcore_core::{Action, PlanRequest};
use agentcore_runtime::{ApplyEngine, LocalClient};
use anyhow::Context;
use std::fs;
use std::path::Path;

use super::{read_deploy_config, read_state};

pub fn run(pack: &Path, config: &Path, state: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let request = PlanRequest {
        pack_json: fs::read_to_string(pack)
            .with_context(|| format!("failed to read pack {}", pack.display()))?,
        deploy_config: read_deploy_config(config)?,
        prior_state: match state {
            Some(path) => read_state(path)?,
            None => String::new(),
        },
    };

    // Planning never calls the provider.
    let engine = ApplyEngine::new(LocalClient::new());
    let plan = engine.plan(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    for change in &plan.changes {
        let marker = match change.action {
            Action::Create => "+",
            Action::Update => "~",
            Action::Delete => "-",
        };
        match &change.prior_arn {
            Some(arn) => println!("{} {} {} ({})", marker, change.resource_type, change.name, arn),
            None => println!("{} {} {}", marker, change.resource_type, change.name),
        }
    }
    for orphan in &plan.orphaned {
        println!("! {} {} ({}) no longer in pack", orphan.resource_type, orphan.name, orphan.arn);
    }
    println!();
    println!("Plan: {}", plan.summary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use tempfile::tempdir;

    #[test]
    fn plans_without_prior_state() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());
        run(&ws.pack, &ws.config, None, false).unwrap();
        run(&ws.pack, &ws.config, Some(&ws.state), true).unwrap();
    }

    #[test]
    fn invalid_pack_is_an_error() {
        let dir = tempdir().unwrap();
        let ws = testing::workspace(dir.path());
        fs::write(&ws.pack, "{not-json").unwrap();
        assert!(run(&ws.pack, &ws.config, None, false).is_err());
    }
}
