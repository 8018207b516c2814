pub mod cluster;

pub use cluster::{ClusterMetadata, ClusterRecord};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored lifecycle state. "Absent" is never stored: it is the lack of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterState {
    Creating, // external create in flight
    Ready,    // provisioned
    Deleting, // external delete in flight
}

impl ClusterState {
    pub fn as_str(&self) -> &str {
        match self {
            ClusterState::Creating => "Creating",
            ClusterState::Ready => "Ready",
            ClusterState::Deleting => "Deleting",
        }
    }

    /// True while an external tool call for this cluster is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ClusterState::Creating | ClusterState::Deleting)
    }
}

impl fmt::Display for ClusterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
