//! Prompt pack model.
//!
//! Only the parts of a pack that decide which cloud resources exist are modeled
//! here. Everything else in the pack JSON is ignored.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::PackError;

/// Suffix appended to an agent name to form its A2A endpoint name.
pub const A2A_SUFFIX: &str = "_a2a";

/// A parsed prompt pack.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Pack {
    pub id: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tools exposed through the gateway, keyed by tool name.
    #[serde(default)]
    pub tools: BTreeMap<String, PackTool>,

    /// Agent members, in pack order.
    #[serde(default)]
    pub agents: Vec<AgentMember>,

    #[serde(default)]
    pub evals: Vec<PackEval>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackTool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tool kind, e.g. "http" or "lambda".
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// JSON Schema of the tool input.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgentMember {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Prompt this agent runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackEval {
    /// Evaluator identity. May be empty; a positional name is used then.
    #[serde(default)]
    pub id: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// When the evaluator fires, e.g. "every_turn" or "on_session_complete".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
}

impl Pack {
    /// Parse and validate a pack from JSON text.
    pub fn parse(content: &str) -> Result<Self, PackError> {
        let pack: Self = serde_json::from_str(content)?;
        pack.validate()?;
        Ok(pack)
    }

    pub fn validate(&self) -> Result<(), PackError> {
        if self.id.trim().is_empty() {
            return Err(PackError::Invalid("pack id is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.trim().is_empty() {
                return Err(PackError::Invalid("agent member with empty name".to_string()));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(PackError::Invalid(format!(
                    "duplicate agent member '{}'",
                    agent.name
                )));
            }
        }
        // An explicit id may also collide with an index fallback.
        let mut evals = HashSet::new();
        for name in self.eval_names() {
            if !evals.insert(name.clone()) {
                return Err(PackError::Invalid(format!("duplicate eval '{}'", name)));
            }
        }
        Ok(())
    }

    /// A pack is multi-agent when it declares more than one agent member.
    pub fn is_multi_agent(&self) -> bool {
        self.agents.len() > 1
    }

    /// Tool gateway entry names, lexicographic.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Runtime names: one per member for multi-agent packs, else the pack id.
    pub fn runtime_names(&self) -> Vec<String> {
        if self.is_multi_agent() {
            self.agents.iter().map(|a| a.name.clone()).collect()
        } else {
            vec![self.id.clone()]
        }
    }

    /// A2A endpoint names. Empty for single-agent packs.
    pub fn a2a_names(&self) -> Vec<String> {
        if !self.is_multi_agent() {
            return Vec::new();
        }
        self.agents
            .iter()
            .map(|a| format!("{}{}", a.name, A2A_SUFFIX))
            .collect()
    }

    pub fn eval_names(&self) -> Vec<String> {
        self.evals
            .iter()
            .enumerate()
            .map(|(i, e)| {
                if e.id.is_empty() {
                    format!("eval_{}", i)
                } else {
                    e.id.clone()
                }
            })
            .collect()
    }
}
