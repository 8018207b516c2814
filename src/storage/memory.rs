use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ClusterError, Result};
use crate::lifecycle::{ClusterStateMachine, LifecycleEvent};
use crate::types::{ClusterRecord, ClusterState};

/// In-memory cluster registry keyed by name.
///
/// Every method takes the lock once and releases it before returning, so a
/// guard can never be held across an `.await` by a caller.
#[derive(Default)]
pub struct ClusterRegistry {
    clusters: Mutex<HashMap<String, ClusterRecord>>,
}

impl ClusterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, ClusterRecord>> {
        // A panic while holding the guard cannot leave a half-written map:
        // every mutation is a single insert or remove.
        self.clusters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `record` if no record exists for its name.
    pub fn admit(&self, record: ClusterRecord) -> Result<()> {
        let mut clusters = self.entries();

        if let Some(existing) = clusters.get(&record.name) {
            return Err(ClusterError::Conflict {
                name: record.name,
                state: existing.state,
            });
        }

        clusters.insert(record.name.clone(), record);
        Ok(())
    }

    /// Apply `event` to the record for `name` and commit the resulting state.
    /// Returns the state before and after; `None` after means removed.
    pub fn apply(&self, name: &str, event: LifecycleEvent) -> Result<(ClusterState, Option<ClusterState>)> {
        let mut clusters = self.entries();

        let record = clusters
            .get_mut(name)
            .ok_or_else(|| ClusterError::NotFound(name.to_string()))?;
        let before = record.state;
        let after = ClusterStateMachine::transition(record, event)?;

        match after {
            Some(next) => record.state = next,
            None => {
                clusters.remove(name);
            }
        }

        Ok((before, after))
    }

    pub fn get(&self, name: &str) -> Option<ClusterRecord> {
        self.entries().get(name).cloned()
    }

    pub fn list(&self) -> Vec<ClusterRecord> {
        let mut records: Vec<ClusterRecord> = self.entries().values().cloned().collect();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClusterMetadata;

    fn create_test_record(name: &str) -> ClusterRecord {
        ClusterRecord::new(
            name,
            ClusterMetadata {
                nodes: Some(2),
                cluster_type: None,
            },
        )
    }

    #[test]
    fn test_admit_and_get() {
        let registry = ClusterRegistry::new();
        registry.admit(create_test_record("dev")).unwrap();

        let retrieved = registry.get("dev").unwrap();
        assert_eq!(retrieved.state, ClusterState::Creating);
        assert_eq!(retrieved.metadata.nodes, Some(2));
        assert!(registry.get("other").is_none());
    }

    #[test]
    fn test_admit_twice_conflicts() {
        let registry = ClusterRegistry::new();
        registry.admit(create_test_record("dev")).unwrap();

        let err = registry.admit(create_test_record("dev")).unwrap_err();
        assert!(matches!(
            err,
            ClusterError::Conflict { state: ClusterState::Creating, .. }
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_apply_commits_transition() {
        let registry = ClusterRegistry::new();
        registry.admit(create_test_record("dev")).unwrap();

        let (before, after) = registry
            .apply("dev", LifecycleEvent::ProvisionSucceeded)
            .unwrap();
        assert_eq!(before, ClusterState::Creating);
        assert_eq!(after, Some(ClusterState::Ready));
        assert!(registry.get("dev").unwrap().is_ready());
    }

    #[test]
    fn test_apply_removal() {
        let registry = ClusterRegistry::new();
        registry.admit(create_test_record("dev")).unwrap();

        let (before, after) = registry.apply("dev", LifecycleEvent::ProvisionFailed).unwrap();
        assert_eq!(before, ClusterState::Creating);
        assert_eq!(after, None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_apply_missing_name() {
        let registry = ClusterRegistry::new();
        let err = registry
            .apply("ghost", LifecycleEvent::DeleteRequested)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rejected_transition_leaves_record() {
        let registry = ClusterRegistry::new();
        registry.admit(create_test_record("dev")).unwrap();

        assert!(registry.apply("dev", LifecycleEvent::DeleteRequested).is_err());
        assert_eq!(registry.get("dev").unwrap().state, ClusterState::Creating);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = ClusterRegistry::new();
        registry.admit(create_test_record("dev")).unwrap();

        let mut snapshot = registry.get("dev").unwrap();
        snapshot.state = ClusterState::Ready;
        snapshot.metadata.nodes = Some(99);

        let stored = registry.get("dev").unwrap();
        assert_eq!(stored.state, ClusterState::Creating);
        assert_eq!(stored.metadata.nodes, Some(2));
    }

    #[test]
    fn test_list_sorted() {
        let registry = ClusterRegistry::new();
        for name in ["gamma", "alpha", "beta"] {
            registry.admit(create_test_record(name)).unwrap();
        }

        let names: Vec<String> = registry.list().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }
}
