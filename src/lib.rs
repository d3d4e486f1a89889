//! launchpad - per-user workload provisioning orchestrator
//!
//! Provisions single-replica workloads on a container cluster from a
//! small catalog of templates, and tears them down again.
//!
//! # Architecture
//!
//! Each launched instance is a triple of cluster resources (workload
//! deployment, internal service, external ingress route) sharing one
//! derived, globally-unique name:
//! - The ledger row is written before any cluster call, so the system
//!   of record never omits an instance that might exist cluster-side
//! - Deletion is best-effort and idempotent; the ledger records user
//!   intent even when the cluster drifts
//! - A reconciliation path polls cluster state and corrects ledger drift
//!
//! # Modules
//!
//! - `cluster`: Cluster client trait, manifests, Kubernetes REST client
//! - `core`: Orchestration logic (naming, backends, seeding)
//! - `domain`: Data structures (Template, Instance, errors)
//! - `store`: Template catalog and instance ledger
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # List launchable templates
//! launchpad templates
//!
//! # Launch an instance for a user
//! launchpad launch <template-id> --user alice
//!
//! # Check live status, then stop
//! launchpad status <instance-id>
//! launchpad stop <instance-id>
//! ```

pub mod cli;
pub mod cluster;
pub mod config;
pub mod core;
pub mod domain;
pub mod store;

// Re-export main types at crate root for convenience
pub use cluster::{ClusterClient, ClusterError, DeleteOutcome, WorkloadState};
pub use config::{ClusterConfig, Settings};
pub use domain::{Instance, InstanceStatus, OrchestratorError, Template};
pub use self::core::{Backend, ClusterBackend, LocalBackend, Orchestrator, Probe};
pub use store::{InstanceStore, TemplateStore};
