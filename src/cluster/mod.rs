//! Cluster Client Adapter: a thin, stateless gateway to the container
//! cluster's control plane.
//!
//! The orchestrator depends on the [`ClusterClient`] trait, never on a
//! concrete client. Every call is scoped to the single namespace the
//! client was constructed with. "Not found" on deletion is translated
//! into a distinguishable outcome so callers can treat it as a
//! successful no-op.

pub mod kube;
pub mod manifest;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

// Re-export the HTTP client implementation
pub use kube::KubeHttpClient;

/// Errors crossing the cluster boundary
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The API answered with a non-success status
    #[error("cluster API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// The request never completed (connection failure, timeout)
    #[error("cluster transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result of a delete call; "already absent" is success for idempotent
/// teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

/// Observed state of one workload's backing pod
#[derive(Debug, Clone)]
pub struct WorkloadState {
    /// Resource name
    pub name: String,

    /// Reported phase (e.g. "Running", "Pending"); "UNKNOWN" when the
    /// cluster reports no phase
    pub phase: String,
}

/// Operations the orchestrator needs from the cluster control plane
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Create the workload (deployment) resource
    async fn create_workload(&self, manifest: &Value) -> Result<(), ClusterError>;

    /// Create the internal service resource
    async fn create_service(&self, manifest: &Value) -> Result<(), ClusterError>;

    /// Create the external route (ingress) resource
    async fn create_route(&self, manifest: &Value) -> Result<(), ClusterError>;

    /// Delete the workload resource by name
    async fn delete_workload(&self, name: &str) -> Result<DeleteOutcome, ClusterError>;

    /// Delete the internal service resource by name
    async fn delete_service(&self, name: &str) -> Result<DeleteOutcome, ClusterError>;

    /// Delete the external route resource by name
    async fn delete_route(&self, name: &str) -> Result<DeleteOutcome, ClusterError>;

    /// List workload pods matching a label selector
    async fn list_workloads(&self, label_selector: &str) -> Result<Vec<WorkloadState>, ClusterError>;
}
