//! Domain types for the launchpad orchestrator.
//!
//! This module contains the core data structures:
//! - Template: launchable catalog entries
//! - Instance: provisioned workloads and their lifecycle
//! - OrchestratorError: the per-request error taxonomy

pub mod error;
pub mod instance;
pub mod template;

// Re-export commonly used types
pub use error::OrchestratorError;
pub use instance::{Instance, InstanceStatus};
pub use template::{Template, TemplateSnapshot};
