use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "agentcore", version, about = "Deploy prompt packs to Bedrock AgentCore")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show what apply would create, update and leave orphaned.
    Plan {
        /// Compiled pack JSON
        #[arg(long)]
        pack: PathBuf,

        /// Deploy config (YAML or JSON)
        #[arg(long, env = "AGENTCORE_CONFIG")]
        config: PathBuf,

        /// State document from the previous apply
        #[arg(long)]
        state: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Create or update every resource the pack needs.
    Apply {
        #[arg(long)]
        pack: PathBuf,

        #[arg(long, env = "AGENTCORE_CONFIG")]
        config: PathBuf,

        /// Read as the prior state, then overwritten with the new one
        #[arg(long, default_value = "agentcore.state.json")]
        state: PathBuf,

        /// Local resource registry
        #[arg(long, env = "AGENTCORE_REGISTRY", default_value = ".agentcore/registry.json")]
        registry: PathBuf,
    },

    /// Delete every resource recorded in a state document.
    Destroy {
        #[arg(long, env = "AGENTCORE_CONFIG")]
        config: PathBuf,

        #[arg(long, default_value = "agentcore.state.json")]
        state: PathBuf,

        #[arg(long, env = "AGENTCORE_REGISTRY", default_value = ".agentcore/registry.json")]
        registry: PathBuf,
    },

    /// Report the health of every recorded resource.
    Status {
        #[arg(long, env = "AGENTCORE_CONFIG")]
        config: PathBuf,

        #[arg(long, default_value = "agentcore.state.json")]
        state: PathBuf,

        #[arg(long, env = "AGENTCORE_REGISTRY", default_value = ".agentcore/registry.json")]
        registry: PathBuf,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries plan and progress output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Plan {
            pack,
            config,
            state,
            json,
        } => commands::plan::run(&pack, &config, state.as_deref(), json),
        Command::Apply {
            pack,
            config,
            state,
            registry,
        } => commands::apply::run(&pack, &config, &state, &registry).await,
        Command::Destroy {
            config,
            state,
            registry,
        } => commands::destroy::run(&config, &state, &registry).await,
        Command::Status {
            config,
            state,
            registry,
            json,
        } => commands::status::run(&config, &state, &registry, json).await,
    }
}
