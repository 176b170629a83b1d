//! Deploy configuration for the AgentCore adapter.
//!
//! The configuration arrives as JSON text inside a plan request and is parsed
//! and validated before any phase runs. Parse and validation failures are fatal
//! to the request.
//!
//! # Example
//!
//! ```json
//! {
//!   "region": "us-west-2",
//!   "runtime_role_arn": "arn:aws:iam::123456789012:role/AgentRuntime",
//!   "tags": { "team": "support" },
//!   "a2a_auth": { "mode": "iam" }
//! }
//! ```

pub mod a2a;
pub mod observability;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::ConfigError;

pub use a2a::{A2aAuthConfig, A2aAuthMode};
pub use observability::ObservabilityConfig;

const MAX_TAGS: usize = 50;
const MAX_TAG_KEY_LEN: usize = 128;
const MAX_TAG_VALUE_LEN: usize = 256;

static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(-[a-z]+)+-\d+$").expect("region pattern compiles"));

static ROLE_ARN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^arn:aws[a-z-]*:iam::(\d{12}):role/.+$").expect("role ARN pattern compiles")
});

/// Complete AgentCore deploy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCoreConfig {
    /// AWS region to deploy into.
    #[serde(default)]
    pub region: String,

    /// IAM role assumed by agent runtimes.
    #[serde(default)]
    pub runtime_role_arn: String,

    /// AWS account ID. Derived from `runtime_role_arn` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,

    /// Extra environment variables injected into every runtime.
    #[serde(default)]
    pub runtime_env_vars: BTreeMap<String, String>,

    /// Tags applied to every created resource.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    /// Agent-to-agent authentication.
    #[serde(default)]
    pub a2a_auth: A2aAuthConfig,

    /// Runtime observability.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AgentCoreConfig {
    /// Parse and validate configuration from JSON text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and value constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.is_empty() {
            return Err(ConfigError::MissingField("region"));
        }
        if !REGION_RE.is_match(&self.region) {
            return Err(ConfigError::invalid(
                "region",
                format!("'{}' is not an AWS region name", self.region),
            ));
        }

        if self.runtime_role_arn.is_empty() {
            return Err(ConfigError::MissingField("runtime_role_arn"));
        }
        if !ROLE_ARN_RE.is_match(&self.runtime_role_arn) {
            return Err(ConfigError::invalid(
                "runtime_role_arn",
                "must be an IAM role ARN (arn:aws:iam::<account>:role/<name>)",
            ));
        }

        if let Some(account) = &self.account_id {
            if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::invalid("account_id", "must be 12 digits"));
            }
        }

        self.validate_tags()?;
        self.a2a_auth.validate()
    }

    fn validate_tags(&self) -> Result<(), ConfigError> {
        if self.tags.len() > MAX_TAGS {
            return Err(ConfigError::invalid(
                "tags",
                format!("at most {} tags allowed, got {}", MAX_TAGS, self.tags.len()),
            ));
        }
        for (key, value) in &self.tags {
            if key.is_empty() || key.len() > MAX_TAG_KEY_LEN {
                return Err(ConfigError::invalid(
                    format!("tags.{}", key),
                    format!("key length must be 1..={}", MAX_TAG_KEY_LEN),
                ));
            }
            if value.len() > MAX_TAG_VALUE_LEN {
                return Err(ConfigError::invalid(
                    format!("tags.{}", key),
                    format!("value longer than {} characters", MAX_TAG_VALUE_LEN),
                ));
            }
        }
        Ok(())
    }

    /// The account that owns deployed resources.
    pub fn account(&self) -> &str {
        if let Some(account) = &self.account_id {
            return account;
        }
        self.runtime_role_arn.split(':').nth(4).unwrap_or_default()
    }
}
