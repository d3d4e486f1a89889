//! Core orchestration logic.
//!
//! This module contains:
//! - Naming: unique resource names and external addressing
//! - Backend: local vs cluster-backed provisioning strategies
//! - Seed: default template catalog seeding
//! - Orchestrator: the exposed operation surface

pub mod backend;
pub mod naming;
pub mod orchestrator;
pub mod seed;

// Re-export commonly used types
pub use backend::{Backend, ClusterBackend, LocalBackend, Probe};
pub use naming::ResourceNames;
pub use orchestrator::Orchestrator;
pub use seed::seed_default_templates;
