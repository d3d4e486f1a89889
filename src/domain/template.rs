//! Workload templates: the launchable catalog entries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// A launchable workload definition.
///
/// Image reference and container port are immutable once any instance
/// references the template; disabling removes it from the launchable set
/// without affecting existing instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: Uuid,

    /// Display name (e.g. "VS Code")
    pub name: String,

    /// Image reference, registry-qualified or relative
    pub image: String,

    /// Container listen port
    pub port: u16,

    /// Icon tag for UI consumers
    #[serde(default)]
    pub icon: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Default environment variables as a JSON object string
    #[serde(default = "default_env")]
    pub env_variables: String,

    /// Whether the template appears in the launchable set
    pub enabled: bool,
}

fn default_env() -> String {
    "{}".to_string()
}

impl Template {
    /// Create a new enabled template
    pub fn new(name: impl Into<String>, image: impl Into<String>, port: u16) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            image: image.into(),
            port,
            icon: String::new(),
            description: String::new(),
            env_variables: default_env(),
            enabled: true,
        }
    }

    /// Parse the stored env-variable JSON into key/value pairs.
    ///
    /// An empty, absent, or unparseable mapping yields zero entries; bad
    /// data is recovered locally with a warning, never surfaced.
    pub fn env_pairs(&self) -> BTreeMap<String, String> {
        parse_env(&self.name, &self.env_variables)
    }
}

fn parse_env(template_name: &str, raw: &str) -> BTreeMap<String, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "{}" {
        return BTreeMap::new();
    }

    match serde_json::from_str::<BTreeMap<String, String>>(raw) {
        Ok(map) => map,
        Err(e) => {
            warn!(template = %template_name, error = %e, "Malformed env variables, treating as empty");
            BTreeMap::new()
        }
    }
}

/// The template fields an instance snapshots at creation time.
///
/// Template mutation after instance creation must not retroactively change
/// a running instance's resource spec, so instances carry their own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSnapshot {
    pub name: String,
    pub image: String,
    pub port: u16,
    pub env_variables: String,
}

impl From<&Template> for TemplateSnapshot {
    fn from(t: &Template) -> Self {
        Self {
            name: t.name.clone(),
            image: t.image.clone(),
            port: t.port,
            env_variables: t.env_variables.clone(),
        }
    }
}

impl TemplateSnapshot {
    /// Same recovery semantics as [`Template::env_pairs`].
    pub fn env_pairs(&self) -> BTreeMap<String, String> {
        parse_env(&self.name, &self.env_variables)
    }
}
