//! Provisioned instances and their lifecycle state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::TemplateSnapshot;

/// Lifecycle status of a provisioned instance.
///
/// Transitions: `Pending → Running` (creation succeeds or reconciliation
/// observes readiness), `Pending → Failed` (creation error),
/// `Running → Stopped` and `Pending → Stopped` (stop request).
/// `Stopped` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    Pending,
    Running,
    Stopped,
    Failed,
}

impl InstanceStatus {
    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }

    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(self, next: InstanceStatus) -> bool {
        if self == next {
            return true;
        }
        match self {
            Self::Pending => true,
            Self::Running => matches!(next, Self::Stopped),
            Self::Stopped | Self::Failed => false,
        }
    }

    /// Stable uppercase name, matching the serialized form
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Stopped => "STOPPED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One provisioned, user-owned workload derived from a template.
///
/// The ledger row is written in `Pending` before any cluster call, so the
/// system of record never omits an instance that might exist cluster-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// Unique identifier
    pub id: Uuid,

    /// Originating template
    pub template_id: Uuid,

    /// Snapshot of the template's spec-relevant fields at creation time
    pub template: TemplateSnapshot,

    /// Owning user
    pub user_id: String,

    /// Cluster resource name shared by workload, service, and route
    pub workload_name: String,

    /// Cluster namespace the resources live in
    pub namespace: String,

    /// Externally reachable URL
    pub access_url: String,

    /// Lifecycle status
    pub status: InstanceStatus,

    /// When the instance was created
    pub created_at: DateTime<Utc>,

    /// When the instance was stopped (None until stopped)
    pub stopped_at: Option<DateTime<Utc>>,
}

impl Instance {
    /// Create a fresh `Pending` ledger row
    pub fn new(
        template: &super::Template,
        user_id: impl Into<String>,
        workload_name: impl Into<String>,
        namespace: impl Into<String>,
        access_url: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: template.id,
            template: TemplateSnapshot::from(template),
            user_id: user_id.into(),
            workload_name: workload_name.into(),
            namespace: namespace.into(),
            access_url: access_url.into(),
            status: InstanceStatus::Pending,
            created_at: Utc::now(),
            stopped_at: None,
        }
    }
}
