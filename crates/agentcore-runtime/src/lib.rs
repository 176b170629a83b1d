//! # agentcore-runtime
//!
//! Plan / apply / destroy / status engine for the AgentCore deploy adapter.
//!
//! Apply turns a pack plus the previous state document into a sequence of
//! create and update calls against an [`AgentCoreClient`], streams progress to
//! a caller callback, and returns a fresh state document even when some
//! resources failed.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use agentcore_core::PlanRequest;
//! use agentcore_runtime::{ApplyEngine, ApplyEvent, LocalClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(request: PlanRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = ApplyEngine::new(LocalClient::new());
//! let mut print = |event: &ApplyEvent| -> anyhow::Result<()> {
//!     println!("{:?}", event);
//!     Ok(())
//! };
//!
//! let outcome = engine
//!     .apply(&request, &mut print, &CancellationToken::new())
//!     .await?;
//! // Persist outcome.state before looking at outcome.error.
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod local;
pub mod orchestrator;
pub mod phase;
pub mod reporter;
pub mod resolver;

pub use adapter::{
    AgentCoreClient, ClientError, CreateResource, Creator, DeployContext, UpdateResource, Updater,
};
pub use error::{ApplyErrors, DeployError, ResourceFailure};
pub use local::{LocalClient, LocalRegistryError, LocalResource};
pub use orchestrator::{ApplyEngine, ApplyOutcome, DestroyOutcome};
pub use phase::{Phase, PhaseResult, phase_fraction, run_phase};
pub use reporter::{ApplyCallback, ApplyEvent, ProgressReporter, ResourceResult, ResultStatus};
pub use resolver::{ResourceOp, resolve_op};
