//! Error taxonomy for the provisioning core.
//!
//! `NotFound`-class errors signal a bad request and are never retried
//! internally; cluster errors signal infrastructure failure. The two must
//! stay distinguishable so callers can map them to different outward
//! signals.

use thiserror::Error;
use uuid::Uuid;

use crate::cluster::ClusterError;

/// Per-request failures of the orchestrator's exposed operations
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Unknown template id
    #[error("Template not found: {0}")]
    TemplateNotFound(Uuid),

    /// Unknown instance id
    #[error("Instance not found: {0}")]
    InstanceNotFound(Uuid),

    /// Create-path cluster failure; the ledger row stays `Pending` for
    /// reconciliation or caller-driven cleanup
    #[error("Cluster provisioning failed: {source}")]
    ClusterProvisioning {
        #[source]
        source: ClusterError,
    },

    /// Delete-path transport failure (distinct from not-found, which is
    /// swallowed as a successful no-op)
    #[error("Cluster deletion failed: {source}")]
    ClusterDeletion {
        #[source]
        source: ClusterError,
    },

    /// Template or instance store failure
    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl OrchestratorError {
    /// Whether this error means the caller's id was unknown
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TemplateNotFound(_) | Self::InstanceNotFound(_)
        )
    }
}
