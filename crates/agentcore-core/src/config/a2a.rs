//! Agent-to-agent authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How agents in a multi-agent pack authenticate calls to one another.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct A2aAuthConfig {
    /// Authentication mode.
    #[serde(default)]
    pub mode: A2aAuthMode,

    /// OIDC discovery URL (required for `jwt`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_url: Option<String>,

    /// Accepted token audiences (`jwt` only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_audience: Vec<String>,
}

/// Authentication mode for A2A endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum A2aAuthMode {
    /// SigV4-signed calls authorized by the runtime role.
    #[default]
    Iam,
    /// Bearer tokens validated against an OIDC issuer.
    Jwt,
}

impl A2aAuthConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.mode != A2aAuthMode::Jwt {
            return Ok(());
        }
        match self.discovery_url.as_deref() {
            Some(url) if url.starts_with("https://") => Ok(()),
            Some(_) => Err(ConfigError::invalid(
                "a2a_auth.discovery_url",
                "must be an https:// URL",
            )),
            None => Err(ConfigError::MissingField("a2a_auth.discovery_url")),
        }
    }
}
