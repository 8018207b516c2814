//! Error types for cluster lifecycle operations.
//!
//! Every variant carries the cluster name so that a failure surfaced to an
//! HTTP caller (or a log line) can be traced back to the request that
//! caused it.

use thiserror::Error;

use crate::lifecycle::LifecycleEvent;
use crate::types::ClusterState;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// A record for this name already exists (in any state).
    #[error("cluster '{name}' already exists ({state})")]
    Conflict { name: String, state: ClusterState },

    #[error("cluster '{0}' does not exist")]
    NotFound(String),

    /// The external tool failed, exited non-zero or timed out during create.
    /// `detail` holds the tool's diagnostic output.
    #[error("failed to create cluster '{name}': {detail}")]
    ProvisionFailure { name: String, detail: String },

    /// The external tool failed during delete. The cluster is still registered.
    #[error("failed to delete cluster '{name}': {detail}")]
    DeprovisionFailure { name: String, detail: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The lifecycle table has no entry for this (state, event) pair.
    #[error("cluster '{name}' cannot apply {event:?} while {state}")]
    InvalidTransition {
        name: String,
        state: ClusterState,
        event: LifecycleEvent,
    },
}

impl ClusterError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClusterError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
