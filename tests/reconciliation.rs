//! Reconciliation Integration Tests
//!
//! Tests the status query path: ledger drift correction, sentinel
//! values, and fail-open behavior on cluster query failure.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use launchpad::cluster::{ClusterClient, ClusterError, DeleteOutcome, WorkloadState};
use launchpad::config::ClusterConfig;
use launchpad::core::{ClusterBackend, LocalBackend, Orchestrator};
use launchpad::domain::{InstanceStatus, OrchestratorError, Template};
use launchpad::store::{InstanceStore, MemoryInstanceStore, MemoryTemplateStore, TemplateStore};

/// Mock cluster whose pod listing can be reconfigured between polls
struct PollableCluster {
    /// None = query failure; Some(vec) = phases of matching pods
    phases: Mutex<Option<Vec<String>>>,
}

impl PollableCluster {
    fn new(phases: Option<Vec<String>>) -> Self {
        Self {
            phases: Mutex::new(phases),
        }
    }

    fn set_phases(&self, phases: Option<Vec<String>>) {
        *self.phases.lock().unwrap() = phases;
    }
}

#[async_trait]
impl ClusterClient for PollableCluster {
    async fn create_workload(&self, _manifest: &Value) -> Result<(), ClusterError> {
        Ok(())
    }

    async fn create_service(&self, _manifest: &Value) -> Result<(), ClusterError> {
        Ok(())
    }

    async fn create_route(&self, _manifest: &Value) -> Result<(), ClusterError> {
        Ok(())
    }

    async fn delete_workload(&self, _name: &str) -> Result<DeleteOutcome, ClusterError> {
        Ok(DeleteOutcome::Deleted)
    }

    async fn delete_service(&self, _name: &str) -> Result<DeleteOutcome, ClusterError> {
        Ok(DeleteOutcome::Deleted)
    }

    async fn delete_route(&self, _name: &str) -> Result<DeleteOutcome, ClusterError> {
        Ok(DeleteOutcome::Deleted)
    }

    async fn list_workloads(&self, selector: &str) -> Result<Vec<WorkloadState>, ClusterError> {
        match self.phases.lock().unwrap().clone() {
            Some(phases) => Ok(phases
                .into_iter()
                .map(|phase| WorkloadState {
                    name: selector.trim_start_matches("app=").to_string(),
                    phase,
                })
                .collect()),
            None => Err(ClusterError::Api {
                status: 503,
                body: "api server unavailable".to_string(),
            }),
        }
    }
}

async fn setup(
    cluster: Arc<PollableCluster>,
) -> (Orchestrator, Arc<MemoryInstanceStore>, Uuid) {
    let templates = Arc::new(MemoryTemplateStore::new());
    let template = Template::new("Jupyter Notebook", "jupyter:latest", 8888);
    let template_id = template.id;
    templates.save(template).await.unwrap();

    let instances = Arc::new(MemoryInstanceStore::new());
    let backend = Arc::new(ClusterBackend::new(cluster, "user-containers", ""));
    let config = ClusterConfig {
        enabled: true,
        domain: "example.com".to_string(),
        ..ClusterConfig::default()
    };

    let orchestrator = Orchestrator::new(templates, instances.clone(), backend, config);
    (orchestrator, instances, template_id)
}

#[tokio::test]
async fn running_phase_returns_ready_and_bumps_ledger_once() {
    let cluster = Arc::new(PollableCluster::new(Some(vec!["Running".to_string()])));
    let (orchestrator, instances, template_id) = setup(cluster).await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();
    assert_eq!(instance.status, InstanceStatus::Pending);

    // Repeated polling: READY every time, ledger converges to Running
    for _ in 0..3 {
        let status = orchestrator.instance_status(instance.id).await.unwrap();
        assert_eq!(status, "READY");
    }

    let reconciled = instances.find_by_id(instance.id).await.unwrap().unwrap();
    assert_eq!(reconciled.status, InstanceStatus::Running);
}

#[tokio::test]
async fn pending_phase_passes_through_without_mutating_ledger() {
    let cluster = Arc::new(PollableCluster::new(Some(vec!["Pending".to_string()])));
    let (orchestrator, instances, template_id) = setup(cluster).await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "PENDING");

    let row = instances.find_by_id(instance.id).await.unwrap().unwrap();
    assert_eq!(row.status, InstanceStatus::Pending);
}

#[tokio::test]
async fn missing_workload_reports_not_found() {
    let cluster = Arc::new(PollableCluster::new(Some(Vec::new())));
    let (orchestrator, _, template_id) = setup(cluster).await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "NOT_FOUND");
}

#[tokio::test]
async fn unexpected_phase_passes_through_verbatim() {
    let cluster = Arc::new(PollableCluster::new(Some(vec![
        "CrashLoopBackOff".to_string()
    ])));
    let (orchestrator, _, template_id) = setup(cluster).await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "CrashLoopBackOff");
}

#[tokio::test]
async fn query_failure_fails_open_with_error_sentinel() {
    let cluster = Arc::new(PollableCluster::new(Some(vec!["Running".to_string()])));
    let (orchestrator, instances, template_id) = setup(cluster.clone()).await;

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    cluster.set_phases(None);
    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "ERROR");

    // Ledger untouched on query failure
    let row = instances.find_by_id(instance.id).await.unwrap().unwrap();
    assert_eq!(row.status, InstanceStatus::Pending);

    // Once the cluster recovers, reconciliation proceeds
    cluster.set_phases(Some(vec!["Running".to_string()]));
    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "READY");
}

#[tokio::test]
async fn unknown_instance_id_is_an_error_not_a_sentinel() {
    let cluster = Arc::new(PollableCluster::new(Some(Vec::new())));
    let (orchestrator, _, _) = setup(cluster).await;

    let missing = Uuid::new_v4();
    let err = orchestrator.instance_status(missing).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::InstanceNotFound(id) if id == missing));
}

#[tokio::test]
async fn local_mode_reports_stored_ledger_status() {
    let templates = Arc::new(MemoryTemplateStore::new());
    let template = Template::new("VS Code", "code-server:latest", 8080);
    let template_id = template.id;
    templates.save(template).await.unwrap();

    let instances = Arc::new(MemoryInstanceStore::new());
    let orchestrator = Orchestrator::new(
        templates,
        instances.clone(),
        Arc::new(LocalBackend),
        ClusterConfig::default(),
    );

    let instance = orchestrator
        .create_instance(template_id, "alice")
        .await
        .unwrap();

    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "RUNNING");

    orchestrator.stop_instance(instance.id).await.unwrap();
    let status = orchestrator.instance_status(instance.id).await.unwrap();
    assert_eq!(status, "STOPPED");
}
