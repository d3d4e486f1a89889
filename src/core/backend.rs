//! Provisioning backends: local (integration disabled) or cluster-backed.
//!
//! The optional cluster collaborator is an explicit strategy selected
//! once at startup, not a nullable dependency checked at every call
//! site. Both strategies sit behind [`Backend`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::cluster::{manifest, ClusterClient, ClusterError, DeleteOutcome};
use crate::domain::{Instance, InstanceStatus, OrchestratorError};

/// Result of a live status probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Integration disabled: the ledger's stored status is authoritative
    Ledger,

    /// No workload matched the instance's label selector
    NotFound,

    /// The cluster reported this phase for the workload
    Phase(String),

    /// The status query itself failed; fail-open, ledger untouched
    Error,
}

/// Capability interface over "where instances actually run"
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create the instance's cluster resources.
    ///
    /// Returns the ledger status the instance should hold after a
    /// successful create.
    async fn provision(
        &self,
        instance: &Instance,
        host: &str,
    ) -> Result<InstanceStatus, OrchestratorError>;

    /// Best-effort teardown of the instance's resources. "Already
    /// absent" is success; only an unexpected API/transport failure is
    /// an error.
    async fn teardown(&self, workload_name: &str) -> Result<(), OrchestratorError>;

    /// Query the live status of a workload
    async fn probe(&self, workload_name: &str) -> Probe;
}

/// Strategy for disabled cluster integration: no cluster calls, instances
/// run "locally" in name only so the rest of the system can function
pub struct LocalBackend;

#[async_trait]
impl Backend for LocalBackend {
    async fn provision(
        &self,
        instance: &Instance,
        _host: &str,
    ) -> Result<InstanceStatus, OrchestratorError> {
        info!(workload = %instance.workload_name, "Cluster disabled - mock instance created");
        Ok(InstanceStatus::Running)
    }

    async fn teardown(&self, workload_name: &str) -> Result<(), OrchestratorError> {
        info!(workload = %workload_name, "Cluster disabled - mock instance stopped");
        Ok(())
    }

    async fn probe(&self, _workload_name: &str) -> Probe {
        Probe::Ledger
    }
}

/// Strategy backed by a real cluster client
pub struct ClusterBackend {
    client: Arc<dyn ClusterClient>,
    namespace: String,
    registry: String,
}

impl ClusterBackend {
    pub fn new(client: Arc<dyn ClusterClient>, namespace: impl Into<String>, registry: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            registry: registry.into(),
        }
    }

    async fn delete_resource(
        &self,
        kind: &str,
        name: &str,
        result: Result<DeleteOutcome, ClusterError>,
    ) -> Option<ClusterError> {
        match result {
            Ok(DeleteOutcome::Deleted) => {
                info!(kind, name, "Resource deleted");
                None
            }
            Ok(DeleteOutcome::AlreadyAbsent) => {
                warn!(kind, name, "Resource not found or already deleted");
                None
            }
            Err(e) => {
                error!(kind, name, error = %e, "Resource deletion failed");
                Some(e)
            }
        }
    }
}

#[async_trait]
impl Backend for ClusterBackend {
    async fn provision(
        &self,
        instance: &Instance,
        host: &str,
    ) -> Result<InstanceStatus, OrchestratorError> {
        let template = &instance.template;
        let name = &instance.workload_name;
        let image = manifest::image_path(&self.registry, &template.image);
        let env = template.env_pairs();

        // Creation order is a correctness requirement: the service and
        // route reference the workload's label selector.
        let workload = manifest::workload(name, &self.namespace, &image, template.port, &env);
        self.client
            .create_workload(&workload)
            .await
            .map_err(|source| OrchestratorError::ClusterProvisioning { source })?;
        info!(workload = %name, "Workload created");

        let service = manifest::service(name, &self.namespace, template.port);
        self.client
            .create_service(&service)
            .await
            .map_err(|source| OrchestratorError::ClusterProvisioning { source })?;
        info!(workload = %name, "Service created");

        let route = manifest::route(name, &self.namespace, host, template.port);
        self.client
            .create_route(&route)
            .await
            .map_err(|source| OrchestratorError::ClusterProvisioning { source })?;
        info!(workload = %name, host, "Route created");

        // True readiness is confirmed asynchronously by reconciliation;
        // the row stays Pending until the workload reports Running.
        Ok(InstanceStatus::Pending)
    }

    async fn teardown(&self, workload_name: &str) -> Result<(), OrchestratorError> {
        // Each deletion is independently wrapped; not-found is success.
        let route = self
            .delete_resource(
                "route",
                workload_name,
                self.client.delete_route(workload_name).await,
            )
            .await;
        let service = self
            .delete_resource(
                "service",
                workload_name,
                self.client.delete_service(workload_name).await,
            )
            .await;
        let workload = self
            .delete_resource(
                "workload",
                workload_name,
                self.client.delete_workload(workload_name).await,
            )
            .await;

        if let Some(source) = route.or(service).or(workload) {
            return Err(OrchestratorError::ClusterDeletion { source });
        }
        Ok(())
    }

    async fn probe(&self, workload_name: &str) -> Probe {
        let selector = format!("app={}", workload_name);
        match self.client.list_workloads(&selector).await {
            Ok(workloads) => match workloads.into_iter().next() {
                Some(state) => Probe::Phase(state.phase),
                None => Probe::NotFound,
            },
            Err(e) => {
                error!(workload = %workload_name, error = %e, "Failed to query workload status");
                Probe::Error
            }
        }
    }
}
