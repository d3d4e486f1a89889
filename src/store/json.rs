//! JSON-file-backed stores.
//!
//! Each store keeps its rows in memory behind a lock and rewrites the
//! whole file on mutation. Adequate for catalog-scale data and easy to
//! inspect/debug; a real database sits behind the same traits.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Instance, InstanceStatus, Template};

use super::{apply_transition, InstanceStore, TemplateStore};

async fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read store file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse store file: {}", path.display()))
}

async fn persist_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(rows)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write store file: {}", path.display()))?;

    Ok(())
}

/// Template store persisted to a single JSON file
pub struct JsonTemplateStore {
    path: PathBuf,
    templates: RwLock<Vec<Template>>,
}

impl JsonTemplateStore {
    /// Open (or create) the store at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let templates = load_rows(&path).await?;
        Ok(Self {
            path,
            templates: RwLock::new(templates),
        })
    }
}

#[async_trait]
impl TemplateStore for JsonTemplateStore {
    async fn save(&self, template: Template) -> Result<Template> {
        let mut templates = self.templates.write().await;
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => templates.push(template.clone()),
        }
        persist_rows(&self.path, &templates).await?;
        Ok(template)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Template>> {
        Ok(self
            .templates
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn find_all_enabled(&self) -> Result<Vec<Template>> {
        Ok(self
            .templates
            .read()
            .await
            .iter()
            .filter(|t| t.enabled)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.templates.read().await.len())
    }
}

/// Instance ledger persisted to a single JSON file
pub struct JsonInstanceStore {
    path: PathBuf,
    instances: RwLock<HashMap<Uuid, Instance>>,
}

impl JsonInstanceStore {
    /// Open (or create) the ledger at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows: Vec<Instance> = load_rows(&path).await?;
        let instances = rows.into_iter().map(|i| (i.id, i)).collect();
        Ok(Self {
            path,
            instances: RwLock::new(instances),
        })
    }

    async fn persist(&self, instances: &HashMap<Uuid, Instance>) -> Result<()> {
        let mut rows: Vec<&Instance> = instances.values().collect();
        rows.sort_by_key(|i| i.created_at);
        persist_rows(&self.path, &rows).await
    }
}

#[async_trait]
impl InstanceStore for JsonInstanceStore {
    async fn save(&self, instance: Instance) -> Result<Instance> {
        let mut instances = self.instances.write().await;
        instances.insert(instance.id, instance.clone());
        self.persist(&instances).await?;
        Ok(instance)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Instance>> {
        Ok(self.instances.read().await.get(&id).cloned())
    }

    async fn find_by_user_and_status_in(
        &self,
        user_id: &str,
        statuses: &[InstanceStatus],
    ) -> Result<Vec<Instance>> {
        let mut matches: Vec<Instance> = self
            .instances
            .read()
            .await
            .values()
            .filter(|i| i.user_id == user_id && statuses.contains(&i.status))
            .cloned()
            .collect();
        matches.sort_by_key(|i| i.created_at);
        Ok(matches)
    }

    async fn update_status(&self, id: Uuid, next: InstanceStatus) -> Result<Option<Instance>> {
        let mut instances = self.instances.write().await;
        let updated = match instances.get_mut(&id) {
            Some(instance) => {
                apply_transition(instance, next);
                Some(instance.clone())
            }
            None => None,
        };

        if updated.is_some() {
            self.persist(&instances).await?;
        }
        Ok(updated)
    }
}
