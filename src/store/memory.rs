//! In-memory store implementations.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Instance, InstanceStatus, Template};

use super::{apply_transition, InstanceStore, TemplateStore};

/// In-memory template store
#[derive(Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<Uuid, Template>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn save(&self, template: Template) -> Result<Template> {
        self.templates
            .write()
            .await
            .insert(template.id, template.clone());
        Ok(template)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Template>> {
        Ok(self.templates.read().await.get(&id).cloned())
    }

    async fn find_all_enabled(&self) -> Result<Vec<Template>> {
        Ok(self
            .templates
            .read()
            .await
            .values()
            .filter(|t| t.enabled)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.templates.read().await.len())
    }
}

/// In-memory instance ledger
#[derive(Default)]
pub struct MemoryInstanceStore {
    instances: RwLock<HashMap<Uuid, Instance>>,
}

impl MemoryInstanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstanceStore for MemoryInstanceStore {
    async fn save(&self, instance: Instance) -> Result<Instance> {
        self.instances
            .write()
            .await
            .insert(instance.id, instance.clone());
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
        Ok(self
            .instances
            .read()
            .await
            .values()
            .filter(|i| i.user_id == user_id && statuses.contains(&i.status))
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, next: InstanceStatus) -> Result<Option<Instance>> {
        let mut instances = self.instances.write().await;
        Ok(instances.get_mut(&id).map(|instance| {
            apply_transition(instance, next);
            instance.clone()
        }))
    }
}
