//! Configuration for launchpad.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (LAUNCHPAD_* overrides for the cluster block)
//! 2. Config file (launchpad.yaml, via --config or LAUNCHPAD_CONFIG)
//! 3. Defaults
//!
//! Resolution produces a [`Settings`] value that is passed explicitly
//! into the orchestrator and the cluster client at construction. Nothing
//! reads configuration from ambient global state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub data_dir: Option<String>,
}

/// Cluster integration block
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Whether cluster integration is enabled; disabled means local/mock
    /// mode with no cluster calls at all
    pub enabled: bool,

    /// Namespace all per-user resources live in
    pub namespace: String,

    /// Registry prefix for relative image references (empty = none)
    pub registry: String,

    /// Base external domain for per-instance subdomains
    pub domain: String,

    /// External ingress port in access URLs
    pub ingress_port: u16,

    /// Kubernetes API server base URL
    pub api_url: String,

    /// Bearer token for the API server (None = unauthenticated)
    pub token: Option<String>,

    /// Per-call deadline on cluster requests, in seconds
    pub request_timeout_seconds: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: "user-containers".to_string(),
            registry: String::new(),
            domain: "localhost".to_string(),
            ingress_port: 30080,
            api_url: "http://localhost:8001".to_string(),
            token: None,
            request_timeout_seconds: 30,
        }
    }
}

/// Resolved configuration passed into constructors
#[derive(Debug, Clone)]
pub struct Settings {
    pub cluster: ClusterConfig,

    /// Directory holding the JSON store files
    pub data_dir: PathBuf,
}

impl Settings {
    /// Per-call deadline for cluster requests
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.cluster.request_timeout_seconds)
    }

    /// Path of the template store file
    pub fn templates_path(&self) -> PathBuf {
        self.data_dir.join("templates.json")
    }

    /// Path of the instance ledger file
    pub fn instances_path(&self) -> PathBuf {
        self.data_dir.join("instances.json")
    }

    /// Load settings from an optional config file plus env overrides.
    ///
    /// Without an explicit path, LAUNCHPAD_CONFIG is consulted; with
    /// neither, defaults apply.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => load_config_file(path)?,
            None => match std::env::var("LAUNCHPAD_CONFIG") {
                Ok(path) => load_config_file(Path::new(&path))?,
                Err(_) => ConfigFile::default(),
            },
        };

        let mut cluster = file.cluster;
        apply_env_overrides(&mut cluster)?;

        let data_dir = match file.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(".launchpad"),
        };

        Ok(Self { cluster, data_dir })
    }
}

/// Load and parse a config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Environment overrides for the cluster block
fn apply_env_overrides(cluster: &mut ClusterConfig) -> Result<()> {
    if let Ok(v) = std::env::var("LAUNCHPAD_CLUSTER_ENABLED") {
        cluster.enabled = v
            .parse()
            .context("LAUNCHPAD_CLUSTER_ENABLED must be true or false")?;
    }
    if let Ok(v) = std::env::var("LAUNCHPAD_NAMESPACE") {
        cluster.namespace = v;
    }
    if let Ok(v) = std::env::var("LAUNCHPAD_REGISTRY") {
        cluster.registry = v;
    }
    if let Ok(v) = std::env::var("LAUNCHPAD_DOMAIN") {
        cluster.domain = v;
    }
    if let Ok(v) = std::env::var("LAUNCHPAD_INGRESS_PORT") {
        cluster.ingress_port = v.parse().context("LAUNCHPAD_INGRESS_PORT must be a port")?;
    }
    if let Ok(v) = std::env::var("LAUNCHPAD_API_URL") {
        cluster.api_url = v;
    }
    if let Ok(v) = std::env::var("LAUNCHPAD_TOKEN") {
        cluster.token = Some(v);
    }
    Ok(())
}
