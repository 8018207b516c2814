use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ClusterState;
use crate::identity::derive_identifier;

/// Caller-supplied creation metadata. Stored as given; nothing in the
/// lifecycle reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterMetadata {
    #[serde(rename = "node", default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub cluster_type: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub name: String,
    pub identifier: String,
    pub state: ClusterState,
    pub metadata: ClusterMetadata,
    pub created_at: DateTime<Utc>,
}

impl ClusterRecord {
    /// A freshly admitted record, in `Creating`.
    pub fn new(name: impl Into<String>, metadata: ClusterMetadata) -> Self {
        let name = name.into();
        Self {
            identifier: derive_identifier(&name),
            name,
            state: ClusterState::Creating,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == ClusterState::Ready
    }
}
