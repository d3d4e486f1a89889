//! Provisioning orchestrator: the exposed operation surface.
//!
//! Turns a template plus a user identity into a concrete set of cluster
//! resources, and reconciles the ledger's view against the cluster's.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::ClusterConfig;
use crate::domain::{Instance, InstanceStatus, OrchestratorError, Template};
use crate::store::{InstanceStore, TemplateStore};

use super::backend::{Backend, Probe};
use super::naming;

type Result<T> = std::result::Result<T, OrchestratorError>;

/// The workload provisioning orchestrator
pub struct Orchestrator {
    templates: Arc<dyn TemplateStore>,
    instances: Arc<dyn InstanceStore>,
    backend: Arc<dyn Backend>,
    cluster: ClusterConfig,
}

impl Orchestrator {
    /// Assemble an orchestrator over its collaborators; the backend
    /// strategy is chosen by the caller once at startup
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        instances: Arc<dyn InstanceStore>,
        backend: Arc<dyn Backend>,
        cluster: ClusterConfig,
    ) -> Self {
        Self {
            templates,
            instances,
            backend,
            cluster,
        }
    }

    /// Enabled templates, the launchable set
    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        Ok(self.templates.find_all_enabled().await?)
    }

    /// Store a template; added templates are always enabled
    pub async fn add_template(&self, mut template: Template) -> Result<Template> {
        template.enabled = true;
        Ok(self.templates.save(template).await?)
    }

    /// Provision a new instance of a template for a user.
    ///
    /// The ledger row is written in `Pending` before any cluster call so
    /// the ledger never omits an instance that might exist cluster-side.
    /// On a provisioning failure the row stays `Pending` for
    /// reconciliation or an explicit stop to clean up.
    #[instrument(skip(self), fields(template_id = %template_id, user_id = %user_id))]
    pub async fn create_instance(&self, template_id: Uuid, user_id: &str) -> Result<Instance> {
        let template = self
            .templates
            .find_by_id(template_id)
            .await?
            .ok_or(OrchestratorError::TemplateNotFound(template_id))?;

        let names = naming::derive(&template.name, &self.cluster.domain, self.cluster.ingress_port);
        info!(workload = %names.workload_name, "Provisioning instance");

        let instance = Instance::new(
            &template,
            user_id,
            &names.workload_name,
            &self.cluster.namespace,
            &names.access_url,
        );
        let instance = self.instances.save(instance).await?;

        let status = match self.backend.provision(&instance, &names.host).await {
            Ok(status) => status,
            Err(e) => {
                error!(instance_id = %instance.id, error = %e, "Provisioning failed, ledger row left Pending");
                return Err(e);
            }
        };

        let updated = self
            .instances
            .update_status(instance.id, status)
            .await?
            .unwrap_or(instance);

        info!(instance_id = %updated.id, status = %updated.status, url = %updated.access_url, "Instance created");
        Ok(updated)
    }

    /// Non-terminal instances owned by a user
    pub async fn list_instances(&self, user_id: &str) -> Result<Vec<Instance>> {
        Ok(self
            .instances
            .find_by_user_and_status_in(
                user_id,
                &[InstanceStatus::Running, InstanceStatus::Pending],
            )
            .await?)
    }

    /// Stop an instance: best-effort cluster teardown, then the ledger
    /// always advances to `Stopped`.
    ///
    /// The ledger records user intent; a teardown transport failure is
    /// flagged loudly rather than blocking the stop, since stuck rows
    /// are worse than transient cluster drift. Idempotent: stopping a
    /// stopped instance is a no-op.
    #[instrument(skip(self), fields(instance_id = %instance_id))]
    pub async fn stop_instance(&self, instance_id: Uuid) -> Result<()> {
        let instance = self
            .instances
            .find_by_id(instance_id)
            .await?
            .ok_or(OrchestratorError::InstanceNotFound(instance_id))?;

        if let Err(e) = self.backend.teardown(&instance.workload_name).await {
            // Possible orphaned live resources; needs operator attention.
            error!(
                workload = %instance.workload_name,
                error = %e,
                "Teardown incomplete, advancing ledger to Stopped anyway"
            );
        }

        self.instances
            .update_status(instance_id, InstanceStatus::Stopped)
            .await?;

        info!(workload = %instance.workload_name, "Instance stopped");
        Ok(())
    }

    /// Live status of an instance, reconciling the ledger as a side
    /// effect.
    ///
    /// Returns `READY`, `PENDING`, `NOT_FOUND`, `ERROR`, or the raw
    /// cluster phase; with integration disabled, the stored ledger
    /// status name. The `Pending → Running` bump is applied at most
    /// once even under repeated polling.
    #[instrument(skip(self), fields(instance_id = %instance_id))]
    pub async fn instance_status(&self, instance_id: Uuid) -> Result<String> {
        let instance = self
            .instances
            .find_by_id(instance_id)
            .await?
            .ok_or(OrchestratorError::InstanceNotFound(instance_id))?;

        match self.backend.probe(&instance.workload_name).await {
            Probe::Ledger => Ok(instance.status.to_string()),
            Probe::NotFound => Ok("NOT_FOUND".to_string()),
            Probe::Error => Ok("ERROR".to_string()),
            Probe::Phase(phase) if phase == "Running" => {
                self.instances
                    .update_status(instance_id, InstanceStatus::Running)
                    .await?;
                Ok("READY".to_string())
            }
            Probe::Phase(phase) if phase == "Pending" => Ok("PENDING".to_string()),
            Probe::Phase(phase) => {
                warn!(workload = %instance.workload_name, %phase, "Workload in unexpected phase");
                Ok(phase)
            }
        }
    }
}
