//! Provisioning Integration Tests
//!
//! Exercises the create and stop paths through the orchestrator with a
//! recording mock cluster client.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use launchpad::cluster::{ClusterClient, ClusterError, DeleteOutcome, WorkloadState};
use launchpad::config::ClusterConfig;
use launchpad::core::{ClusterBackend, LocalBackend, Orchestrator};
use launchpad::domain::{InstanceStatus, OrchestratorError, Template};
use launchpad::store::{InstanceStore, MemoryInstanceStore, MemoryTemplateStore, TemplateStore};

/// How the mock answers a delete call
#[derive(Clone, Copy)]
enum DeleteBehavior {
    Deleted,
    Absent,
    Fail,
}

/// How the mock answers the workload listing
enum ListBehavior {
    Phases(Vec<String>),
    Empty,
    Fail,
}

/// Mock cluster client recording every call in order
struct RecordingCluster {
    calls: Mutex<Vec<String>>,
    fail_create: Option<&'static str>,
    route_delete: DeleteBehavior,
    service_delete: DeleteBehavior,
    workload_delete: DeleteBehavior,
    list: ListBehavior,
}

impl RecordingCluster {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_create: None,
            route_delete: DeleteBehavior::Deleted,
            service_delete: DeleteBehavior::Deleted,
            workload_delete: DeleteBehavior::Deleted,
            list: ListBehavior::Empty,
        }
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn api_error() -> ClusterError {
        ClusterError::Api {
            status: 500,
            body: "boom".to_string(),
        }
    }

    fn create(&self, kind: &'static str) -> Result<(), ClusterError> {
        self.record(&format!("create_{}", kind));
        if self.fail_create == Some(kind) {
            return Err(Self::api_error());
        }
        Ok(())
    }

    fn delete(&self, kind: &str, behavior: DeleteBehavior) -> Result<DeleteOutcome, ClusterError> {
        self.record(&format!("delete_{}", kind));
        match behavior {
            DeleteBehavior::Deleted => Ok(DeleteOutcome::Deleted),
            DeleteBehavior::Absent => Ok(DeleteOutcome::AlreadyAbsent),
            DeleteBehavior::Fail => Err(Self::api_error()),
        }
    }
}

#[async_trait]
impl ClusterClient for RecordingCluster {
    async fn create_workload(&self, _manifest: &Value) -> Result<(), ClusterError> {
        self.create("workload")
    }

    async fn create_service(&self, _manifest: &Value) -> Result<(), ClusterError> {
        self.create("service")
    }

    async fn create_route(&self, _manifest: &Value) -> Result<(), ClusterError> {
        self.create("route")
    }

    async fn delete_workload(&self, _name: &str) -> Result<DeleteOutcome, ClusterError> {
        self.delete("workload", self.workload_delete)
    }

    async fn delete_service(&self, _name: &str) -> Result<DeleteOutcome, ClusterError> {
        self.delete("service", self.service_delete)
    }

    async fn delete_route(&self, _name: &str) -> Result<DeleteOutcome, ClusterError> {
        self.delete("route", self.route_delete)
    }

    async fn list_workloads(&self, selector: &str) -> Result<Vec<WorkloadState>, ClusterError> {
        self.record("list_workloads");
        match &self.list {
            ListBehavior::Phases(phases) => Ok(phases
                .iter()
                .map(|phase| WorkloadState {
                    name: selector.trim_start_matches("app=").to_string(),
                    phase: phase.clone(),
                })
                .collect()),
            ListBehavior::Empty => Ok(Vec::new()),
            ListBehavior::Fail => Err(Self::api_error()),
        }
    }
}

fn cluster_config() -> ClusterConfig {
    ClusterConfig {
        enabled: true,
        domain: "example.com".to_string(),
        ..ClusterConfig::default()
    }
}

/// Orchestrator over memory stores and the given mock cluster
async fn cluster_orchestrator(
    cluster: Arc<RecordingCluster>,
) -> (Orchestrator, Arc<MemoryInstanceStore>, Uuid) {
    let templates = Arc::new(MemoryTemplateStore::new());
    let template = Template::new("VS Code", "code-server:latest", 8080);
    let template_id = template.id;
    templates.save(template).await.unwrap();

    let instances = Arc::new(MemoryInstanceStore::new());
    let backend = Arc::new(ClusterBackend::new(cluster, "user-containers", ""));

    let orchestrator = Orchestrator::new(
        templates,
        instances.clone(),
        backend,
        cluster_config(),
    );
    (orchestrator, instances, template_id)
}

/// Orchestrator in local mode (cluster integration disabled)
async fn local_orchestrator() -> (Orchestrator, Arc<MemoryInstanceStore>, Uuid) {
    let templates = Arc::new(MemoryTemplateStore::new());
    let template = Template::new("VS Code", "code-server:latest", 8080);
    let template_id = template.id;
    templates.save(template).await.unwrap();

    let instances = Arc::new(MemoryInstanceStore::new());
    let config = ClusterConfig {
        enabled: false,
        domain: "example.com".to_string(),
        ..ClusterConfig::default()
    };

    let orchestrator = Orchestrator::new(
        templates,
        instances.clone(),
        Arc::new(LocalBackend),
        config,
    );
    (orchestrator, instances, template_id)
}

#[tokio::test]
async fn local_mode_creates_running_instance() {
    let (orchestrator, _, template_id) = local_orchestrator().await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    assert_eq!(instance.status, InstanceStatus::Running);
    assert!(!instance.access_url.is_empty());

    // Workload name matches vs-code-<8 hex chars>
    let suffix = instance.workload_name.strip_prefix("vs-code-").unwrap();
    assert_eq!(suffix.len(), 8);
    assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn access_url_shares_the_workload_token() {
    let (orchestrator, _, template_id) = local_orchestrator().await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    let token = instance.workload_name.strip_prefix("vs-code-").unwrap();
    assert_eq!(
        instance.access_url,
        format!("http://{}.example.com:30080", token)
    );
}

#[tokio::test]
async fn concurrent_launches_get_distinct_names() {
    let (orchestrator, _, template_id) = local_orchestrator().await;

    let a = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();
    let b = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    assert_ne!(a.workload_name, b.workload_name);
    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn unknown_template_yields_not_found_and_no_row() {
    let (orchestrator, instances, _) = local_orchestrator().await;

    let missing = Uuid::new_v4();
    let err = orchestrator
        .create_instance(missing, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::TemplateNotFound(id) if id == missing));

    let rows = instances
        .find_by_user_and_status_in(
            "alice",
            &[
                InstanceStatus::Pending,
                InstanceStatus::Running,
                InstanceStatus::Stopped,
                InstanceStatus::Failed,
            ],
        )
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn cluster_create_issues_resources_in_order() {
    let cluster = Arc::new(RecordingCluster::new());
    let (orchestrator, _, template_id) = cluster_orchestrator(cluster.clone()).await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    assert_eq!(
        cluster.calls(),
        vec!["create_workload", "create_service", "create_route"]
    );
    // Real readiness is confirmed by reconciliation later
    assert_eq!(instance.status, InstanceStatus::Pending);
}

#[tokio::test]
async fn service_failure_halts_creation_and_leaves_pending_row() {
    let mut mock = RecordingCluster::new();
    mock.fail_create = Some("service");
    let cluster = Arc::new(mock);

    let (orchestrator, instances, template_id) = cluster_orchestrator(cluster.clone()).await;

    let err = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, OrchestratorError::ClusterProvisioning { .. }));

    // Creation halted at the failing step: no route was requested
    assert_eq!(cluster.calls(), vec!["create_workload", "create_service"]);

    // Exactly one ledger row, still Pending
    let rows = instances
        .find_by_user_and_status_in("alice", &[InstanceStatus::Pending])
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn stop_swallows_absent_route() {
    let mut mock = RecordingCluster::new();
    mock.route_delete = DeleteBehavior::Absent;
    let cluster = Arc::new(mock);

    let (orchestrator, instances, template_id) = cluster_orchestrator(cluster).await;
    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    orchestrator.stop_instance(instance.id).await.unwrap();

    let stopped = instances.find_by_id(instance.id).await.unwrap().unwrap();
    assert_eq!(stopped.status, InstanceStatus::Stopped);
    assert!(stopped.stopped_at.is_some());
}

#[tokio::test]
async fn stop_is_idempotent() {
    let mut mock = RecordingCluster::new();
    mock.route_delete = DeleteBehavior::Absent;
    mock.service_delete = DeleteBehavior::Absent;
    mock.workload_delete = DeleteBehavior::Absent;
    let cluster = Arc::new(mock);

    let (orchestrator, instances, template_id) = cluster_orchestrator(cluster).await;
    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    orchestrator.stop_instance(instance.id).await.unwrap();
    // Second stop: resources already absent cluster-side, still no error
    orchestrator.stop_instance(instance.id).await.unwrap();

    let stopped = instances.find_by_id(instance.id).await.unwrap().unwrap();
    assert_eq!(stopped.status, InstanceStatus::Stopped);
}

#[tokio::test]
async fn stop_advances_ledger_even_on_transport_failure() {
    let mut mock = RecordingCluster::new();
    mock.workload_delete = DeleteBehavior::Fail;
    let cluster = Arc::new(mock);

    let (orchestrator, instances, template_id) = cluster_orchestrator(cluster).await;
    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    // Best-effort policy: the stop itself succeeds
    orchestrator.stop_instance(instance.id).await.unwrap();

    let stopped = instances.find_by_id(instance.id).await.unwrap().unwrap();
    assert_eq!(stopped.status, InstanceStatus::Stopped);
    assert!(stopped.stopped_at.is_some());
}

#[tokio::test]
async fn stop_unknown_instance_is_not_found() {
    let (orchestrator, _, _) = local_orchestrator().await;

    let missing = Uuid::new_v4();
    let err = orchestrator.stop_instance(missing).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::InstanceNotFound(id) if id == missing));
}

#[tokio::test]
async fn stopped_instances_leave_the_user_listing() {
    let (orchestrator, _, template_id) = local_orchestrator().await;

    let keep = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();
    let stop = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    orchestrator.stop_instance(stop.id).await.unwrap();

    let listed = orchestrator.list_instances("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, keep.id);
}

#[tokio::test]
async fn added_templates_are_enabled_and_listed() {
    let (orchestrator, _, _) = local_orchestrator().await;

    let mut template = Template::new("RStudio", "rstudio:latest", 8787);
    template.enabled = false;
    let stored = orchestrator.add_template(template).await.unwrap();
    assert!(stored.enabled);

    let listed = orchestrator.list_templates().await.unwrap();
    assert!(listed.iter().any(|t| t.id == stored.id));
}
