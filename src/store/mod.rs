//! Template store and instance ledger.
//!
//! The orchestrator depends on the store traits only. Two implementations
//! ship: a JSON-file-backed store for the CLI's local persistence and an
//! in-memory store used in tests and embedding.
//!
//! Status updates go through [`InstanceStore::update_status`], which
//! applies the read-modify-write as one atomic operation keyed by
//! instance id so concurrent reconciliation polls cannot lose updates.
//! Illegal transitions (anything out of a terminal state) are silently
//! preserved as the current row, which is what makes stop idempotent.

pub mod json;
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Instance, InstanceStatus, Template};

pub use json::{JsonInstanceStore, JsonTemplateStore};
pub use memory::{MemoryInstanceStore, MemoryTemplateStore};

/// System-of-record for templates
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Insert or replace a template
    async fn save(&self, template: Template) -> Result<Template>;

    /// Look up one template by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Template>>;

    /// All templates with `enabled = true`
    async fn find_all_enabled(&self) -> Result<Vec<Template>>;

    /// Total number of templates, enabled or not
    async fn count(&self) -> Result<usize>;
}

/// System-of-record for provisioned instances
#[async_trait]
pub trait InstanceStore: Send + Sync {
    /// Insert or replace an instance row
    async fn save(&self, instance: Instance) -> Result<Instance>;

    /// Look up one instance by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Instance>>;

    /// Instances owned by a user whose status is in the given set
    async fn find_by_user_and_status_in(
        &self,
        user_id: &str,
        statuses: &[InstanceStatus],
    ) -> Result<Vec<Instance>>;

    /// Atomically move an instance to `next` if the transition is legal.
    ///
    /// Transitioning into `Stopped` records the stop timestamp. An
    /// illegal transition leaves the row untouched; the stored row (or
    /// `None` for an unknown id) is returned either way.
    async fn update_status(&self, id: Uuid, next: InstanceStatus) -> Result<Option<Instance>>;
}

/// Shared transition rule for store implementations
pub(crate) fn apply_transition(instance: &mut Instance, next: InstanceStatus) {
    if instance.status == next || !instance.status.can_transition_to(next) {
        return;
    }
    instance.status = next;
    if next == InstanceStatus::Stopped {
        instance.stopped_at = Some(chrono::Utc::now());
    }
}
