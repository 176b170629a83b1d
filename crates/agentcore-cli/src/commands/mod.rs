//! CLI command implementations for the AgentCore deploy adapter.

pub mod apply;
pub mod destroy;
pub mod plan;
pub mod status;

use agentcore_core::{AdapterState, decode_state, serialize_state};
use agentcore_runtime::{ApplyCallback, ApplyEvent, LocalClient};
use anyhow::Context;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Read a deploy config file and return it as a JSON string.
///
/// `.yaml` / `.yml` files are converted; anything else is passed through.
pub fn read_deploy_config(path: &Path) -> anyhow::Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read deploy config {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            let value: serde_json::Value = serde_yaml::from_str(&content)
                .with_context(|| format!("failed to parse YAML config {}", path.display()))?;
            Ok(serde_json::to_string(&value)?)
        }
        _ => Ok(content),
    }
}

/// Read a state file. A missing file is an empty state.
pub fn read_state(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read state {}", path.display()))
}

pub fn write_state(path: &Path, state: &str) -> anyhow::Result<()> {
    ensure_parent(path)?;
    fs::write(path, state).with_context(|| format!("failed to write state {}", path.display()))
}

pub fn open_registry(path: &Path) -> anyhow::Result<LocalClient> {
    LocalClient::load(path).with_context(|| format!("failed to load registry {}", path.display()))
}

pub fn save_registry(client: &LocalClient, path: &Path) -> anyhow::Result<()> {
    ensure_parent(path)?;
    client
        .save(path)
        .with_context(|| format!("failed to save registry {}", path.display()))
}

/// Companion document holding resources that newer applies replaced or
/// dropped. Destroy tears it down after the main state.
pub fn superseded_path(state: &Path) -> PathBuf {
    let mut path = state.as_os_str().to_owned();
    path.push(".superseded");
    PathBuf::from(path)
}

/// Move prior entries whose ARN is absent from `next` into the superseded
/// document. Returns how many entries were added.
pub fn retain_superseded(state: &Path, prior: &str, next: &str) -> anyhow::Result<usize> {
    let prior = match decode_state(prior) {
        Ok(Some(prior)) => prior,
        Ok(None) => return Ok(0),
        Err(e) => {
            tracing::warn!(error = %e, "Prior state unreadable, nothing to retain");
            return Ok(0);
        }
    };
    let next = decode_state(next)?.unwrap_or_default();
    let live: HashSet<&str> = next.resources.iter().map(|r| r.arn.as_str()).collect();

    let path = superseded_path(state);
    let mut retained = decode_state(&read_state(&path)?)
        .with_context(|| format!("superseded state {} is corrupt", path.display()))?
        .unwrap_or_else(|| AdapterState::new(prior.pack_id.clone(), prior.version.clone(), Vec::new()));
    let known: HashSet<String> = retained.resources.iter().map(|r| r.arn.clone()).collect();

    let replaced: Vec<_> = prior
        .resources
        .into_iter()
        .filter(|r| !r.arn.is_empty() && !live.contains(r.arn.as_str()) && !known.contains(&r.arn))
        .collect();
    if replaced.is_empty() {
        return Ok(0);
    }

    let count = replaced.len();
    tracing::info!(count, path = %path.display(), "Keeping replaced resources for destroy");
    retained.resources.extend(replaced);
    write_state(&path, &serialize_state(&retained)?)?;
    Ok(count)
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Cancel `token` on Ctrl-C. Abort the returned handle once the run is over.
pub fn cancel_on_interrupt(token: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the in-flight resource");
            token.cancel();
        }
    })
}

/// Prints one line per event to stdout.
///
/// A failed write is returned to the engine, which stops the run.
pub struct ConsolePrinter<W: Write + Send> {
    out: W,
}

impl ConsolePrinter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> ApplyCallback for ConsolePrinter<W> {
    fn on_event(&mut self, event: &ApplyEvent) -> anyhow::Result<()> {
        match event {
            ApplyEvent::Progress { message, fraction } => {
                writeln!(self.out, "[{:>3.0}%] {}", fraction * 100.0, message)?
            }
            ApplyEvent::Resource(result) => writeln!(
                self.out,
                "       {} {} {} ({})",
                result.status, result.resource_type, result.name, result.detail
            )?,
            ApplyEvent::Error {
                resource_type,
                name,
                message,
            } => writeln!(self.out, "       error {} {}: {}", resource_type, name, message)?,
        }
        Ok(())
    }
}
