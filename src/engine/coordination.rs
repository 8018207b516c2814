use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::error::{ClusterError, Result};
use crate::lifecycle::LifecycleEvent;
use crate::providers::{ClusterProvider, ProviderError, ToolOutput, Verb};
use crate::storage::ClusterRegistry;
use crate::types::{ClusterMetadata, ClusterRecord, ClusterState};

/// Owns the cluster registry and drives every create and delete through the
/// external provider.
///
/// Each mutating operation runs in three steps: a registry update under the
/// lock that makes the operation visible (and rejects conflicting ones), the
/// provider call with no lock held, and a second registry update that
/// commits the outcome. The last two steps run on a spawned task, so a
/// caller that stops waiting cannot leave a record stuck in flight.
pub struct ClusterCoordinator {
    registry: Arc<ClusterRegistry>,
    provider: Arc<dyn ClusterProvider>,
    create_args: Vec<String>,
}

impl ClusterCoordinator {
    pub fn new(provider: Arc<dyn ClusterProvider>) -> Self {
        Self {
            registry: Arc::new(ClusterRegistry::new()),
            provider,
            create_args: Vec::new(),
        }
    }

    /// Extra arguments appended to every create invocation.
    pub fn with_create_args(mut self, args: Vec<String>) -> Self {
        self.create_args = args;
        self
    }

    pub async fn create_cluster(&self, name: &str, metadata: ClusterMetadata) -> Result<String> {
        let record = ClusterRecord::new(name, metadata);
        let identifier = record.identifier.clone();

        if let Err(e) = self.registry.admit(record) {
            log::warn!("Rejected create: {}", e);
            return Err(e);
        }
        log::info!("Creating cluster '{}' ({})", name, identifier);

        match self.drive(Verb::Create, name, self.create_args.clone()).await? {
            Ok(_) => {
                log::info!("Cluster '{}' is ready", name);
                Ok(identifier)
            }
            Err(e) => {
                let err = ClusterError::ProvisionFailure {
                    name: name.to_string(),
                    detail: e.to_string(),
                };
                log::warn!("{}; registry entry rolled back", err);
                Err(err)
            }
        }
    }

    pub async fn delete_cluster(&self, name: &str) -> Result<()> {
        match self.registry.apply(name, LifecycleEvent::DeleteRequested) {
            Ok((before, after)) => log_transition(name, before, after),
            Err(e) => {
                log::warn!("Rejected delete: {}", e);
                return Err(e);
            }
        }
        log::info!("Deleting cluster '{}'", name);

        match self.drive(Verb::Delete, name, Vec::new()).await? {
            Ok(_) => {
                log::info!("Cluster '{}' deleted", name);
                Ok(())
            }
            Err(e) => {
                let err = ClusterError::DeprovisionFailure {
                    name: name.to_string(),
                    detail: e.to_string(),
                };
                log::warn!("{}; cluster restored to Ready", err);
                Err(err)
            }
        }
    }

    /// A detached copy of the record; mutating it does not touch the registry.
    pub async fn get_cluster(&self, name: &str) -> Result<ClusterRecord> {
        self.registry
            .get(name)
            .ok_or_else(|| ClusterError::NotFound(name.to_string()))
    }

    pub async fn list_clusters(&self) -> Vec<ClusterRecord> {
        self.registry.list()
    }

    /// Invoke the provider and commit the outcome on a spawned task. The
    /// outer `Result` is the commit, the inner one is the provider outcome.
    async fn drive(
        &self,
        verb: Verb,
        name: &str,
        args: Vec<String>,
    ) -> Result<std::result::Result<ToolOutput, ProviderError>> {
        let (succeeded, failed) = match verb {
            Verb::Create => (LifecycleEvent::ProvisionSucceeded, LifecycleEvent::ProvisionFailed),
            Verb::Delete => (LifecycleEvent::DeprovisionSucceeded, LifecycleEvent::DeprovisionFailed),
        };

        let registry = Arc::clone(&self.registry);
        let provider = Arc::clone(&self.provider);
        let name = name.to_string();

        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(provider.invoke(verb, &name, &args))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    Err(ProviderError::Aborted {
                        verb,
                        reason: panic_message(panic.as_ref()),
                    })
                });

            let event = if outcome.is_ok() { succeeded } else { failed };
            let (before, after) = registry.apply(&name, event)?;
            log_transition(&name, before, after);
            Ok::<_, ClusterError>(outcome)
        });

        task.await.unwrap_or_else(|e| {
            Ok(Err(ProviderError::Aborted {
                verb,
                reason: e.to_string(),
            }))
        })
    }
}

fn log_transition(name: &str, before: ClusterState, after: Option<ClusterState>) {
    match after {
        Some(after) => log::debug!("Cluster '{}': {} -> {}", name, before, after),
        None => log::debug!("Cluster '{}': {} -> removed", name, before),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "provider panicked".to_string()
    }
}
