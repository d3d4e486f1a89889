//! Kubernetes REST implementation of the cluster client.
//!
//! Talks to the API server over HTTP with optional bearer-token auth.
//! Each client is scoped to one namespace; a per-call deadline is set on
//! the underlying HTTP client since the API server imposes none.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::{ClusterClient, ClusterError, DeleteOutcome, WorkloadState};

/// HTTP client for the Kubernetes API server
pub struct KubeHttpClient {
    client: reqwest::Client,
    base_url: String,
    namespace: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    metadata: PodMetadata,
    #[serde(default)]
    status: Option<PodStatus>,
}

#[derive(Debug, Deserialize)]
struct PodMetadata {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PodStatus {
    phase: Option<String>,
}

impl KubeHttpClient {
    /// Create a client for one API server and namespace.
    ///
    /// `request_timeout` bounds every call; expiry surfaces as a
    /// transport error.
    pub fn new(
        base_url: impl Into<String>,
        namespace: impl Into<String>,
        token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, ClusterError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            token,
        })
    }

    fn url(&self, api_prefix: &str, kind: &str, name: Option<&str>) -> String {
        let mut url = format!(
            "{}/{}/namespaces/{}/{}",
            self.base_url, api_prefix, self.namespace, kind
        );
        if let Some(name) = name {
            url.push('/');
            url.push_str(name);
        }
        url
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn create(&self, api_prefix: &str, kind: &str, manifest: &Value) -> Result<(), ClusterError> {
        let url = self.url(api_prefix, kind, None);
        debug!(%url, "Creating cluster resource");

        let response = self
            .authorize(self.client.post(&url).json(manifest))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(kind, "Cluster resource created");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClusterError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn delete(&self, api_prefix: &str, kind: &str, name: &str) -> Result<DeleteOutcome, ClusterError> {
        let url = self.url(api_prefix, kind, Some(name));
        debug!(%url, "Deleting cluster resource");

        let response = self.authorize(self.client.delete(&url)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!(kind, name, "Resource already absent");
            return Ok(DeleteOutcome::AlreadyAbsent);
        }
        if status.is_success() {
            info!(kind, name, "Cluster resource deleted");
            return Ok(DeleteOutcome::Deleted);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClusterError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ClusterClient for KubeHttpClient {
    async fn create_workload(&self, manifest: &Value) -> Result<(), ClusterError> {
        self.create("apis/apps/v1", "deployments", manifest).await
    }

    async fn create_service(&self, manifest: &Value) -> Result<(), ClusterError> {
        self.create("api/v1", "services", manifest).await
    }

    async fn create_route(&self, manifest: &Value) -> Result<(), ClusterError> {
        self.create("apis/networking.k8s.io/v1", "ingresses", manifest)
            .await
    }

    async fn delete_workload(&self, name: &str) -> Result<DeleteOutcome, ClusterError> {
        self.delete("apis/apps/v1", "deployments", name).await
    }

    async fn delete_service(&self, name: &str) -> Result<DeleteOutcome, ClusterError> {
        self.delete("api/v1", "services", name).await
    }

    async fn delete_route(&self, name: &str) -> Result<DeleteOutcome, ClusterError> {
        self.delete("apis/networking.k8s.io/v1", "ingresses", name)
            .await
    }

    async fn list_workloads(&self, label_selector: &str) -> Result<Vec<WorkloadState>, ClusterError> {
        let url = format!(
            "{}/api/v1/namespaces/{}/pods",
            self.base_url, self.namespace
        );

        let response = self
            .authorize(
                self.client
                    .get(&url)
                    .query(&[("labelSelector", label_selector)]),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClusterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let pods: PodList = response.json().await?;
        Ok(pods
            .items
            .into_iter()
            .map(|pod| WorkloadState {
                name: pod.metadata.name,
                phase: pod
                    .status
                    .and_then(|s| s.phase)
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
            })
            .collect())
    }
}
