//! State document codec.
//!
//! The prior state handed to apply is read leniently: a blank or unparsable
//! document yields an empty index and apply falls back to creating everything.
//! Destroy and status read strictly through [`decode_state`] because silently
//! dropping a real deployment there would leak resources.

use std::collections::HashMap;

use crate::error::StateError;
use crate::{AdapterState, ResourceState, ResourceType};

/// Composite key for a resource: `"{type}/{name}"`.
pub fn resource_key(resource_type: ResourceType, name: &str) -> String {
    format!("{}/{}", resource_type, name)
}

/// Read-only lookup of prior resources by `(type, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorIndex {
    entries: HashMap<String, ResourceState>,
}

impl PriorIndex {
    /// Index every resource of a state document. Later duplicates win.
    pub fn from_state(state: &AdapterState) -> Self {
        let entries = state
            .resources
            .iter()
            .map(|r| (r.key(), r.clone()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, resource_type: ResourceType, name: &str) -> Option<&ResourceState> {
        self.entries.get(&resource_key(resource_type, name))
    }

    pub fn contains(&self, resource_type: ResourceType, name: &str) -> bool {
        self.get(resource_type, name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceState> {
        self.entries.values()
    }
}

/// Parse a prior state document into a lookup index. Never fails.
pub fn parse_prior_state(content: &str) -> PriorIndex {
    if content.trim().is_empty() {
        return PriorIndex::default();
    }
    match serde_json::from_str::<AdapterState>(content) {
        Ok(state) => PriorIndex::from_state(&state),
        Err(e) => {
            tracing::warn!(error = %e, "Prior state is unparsable, treating as absent");
            PriorIndex::default()
        }
    }
}

/// Strictly decode a state document. A blank document decodes to `None`.
pub fn decode_state(content: &str) -> Result<Option<AdapterState>, StateError> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(content)
        .map(Some)
        .map_err(StateError::Decode)
}

pub fn serialize_state(state: &AdapterState) -> Result<String, StateError> {
    serde_json::to_string(state).map_err(StateError::Encode)
}
