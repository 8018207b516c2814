use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};
use crate::types::{ClusterRecord, ClusterState};

/// Events applied to an existing record. Creation of a new record is
/// admission, not a transition, and is handled by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    ProvisionSucceeded,
    ProvisionFailed,
    DeleteRequested,
    DeprovisionSucceeded,
    DeprovisionFailed,
}

pub struct ClusterStateMachine;

impl ClusterStateMachine {
    /// Next state for `record` under `event`. `None` means the record leaves
    /// the registry.
    pub fn transition(record: &ClusterRecord, event: LifecycleEvent) -> Result<Option<ClusterState>> {
        let next = match (record.state, event) {
            (ClusterState::Creating, LifecycleEvent::ProvisionSucceeded) => Some(ClusterState::Ready),
            (ClusterState::Creating, LifecycleEvent::ProvisionFailed) => None,

            (ClusterState::Ready, LifecycleEvent::DeleteRequested) => Some(ClusterState::Deleting),
            (ClusterState::Deleting, LifecycleEvent::DeprovisionSucceeded) => None,
            (ClusterState::Deleting, LifecycleEvent::DeprovisionFailed) => Some(ClusterState::Ready),

            // Another operation owns the cluster until its tool call returns.
            (state, LifecycleEvent::DeleteRequested) if state.is_in_flight() => {
                return Err(ClusterError::Conflict {
                    name: record.name.clone(),
                    state,
                });
            }

            (state, event) => {
                return Err(ClusterError::InvalidTransition {
                    name: record.name.clone(),
                    state,
                    event,
                });
            }
        };

        Ok(next)
    }
}
