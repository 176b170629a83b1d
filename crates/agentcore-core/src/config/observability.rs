//! Observability configuration for deployed runtimes.

use serde::{Deserialize, Serialize};

/// Whether deployed runtimes emit traces and logs, and where logs land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Whether runtime observability is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// CloudWatch log group override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_group: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_group: None,
        }
    }
}

fn default_true() -> bool {
    true
}
