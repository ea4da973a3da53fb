//! In-process remote store
//!
//! Holds resources in a map and stamps timestamps the way a real custom data
//! endpoint does. Useful for local-only mode and for tests.

use super::{RemoteStore, SavedResource, StoreResult};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::resource::{Properties, CREATED_AT, MODIFIED_AT};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

pub struct InMemoryStore {
    config: StoreConfig,
    /// Properties by resource href
    resources: Mutex<HashMap<String, Properties>>,
}

impl InMemoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            resources: Mutex::new(HashMap::new()),
        }
    }

    /// Seed a resource, replacing whatever was stored under `href`
    pub async fn insert(&self, href: impl Into<String>, properties: Properties) {
        self.resources.lock().await.insert(href.into(), properties);
    }

    /// Snapshot of a stored resource
    pub async fn resource(&self, href: &str) -> Option<Properties> {
        self.resources.lock().await.get(href).cloned()
    }

    pub async fn len(&self) -> usize {
        self.resources.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

fn now_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn fetch_properties(&self, href: &str) -> StoreResult<Properties> {
        self.resources
            .lock()
            .await
            .get(href)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(href.to_string()))
    }

    async fn delete_property(&self, href: &str, name: &str) -> StoreResult<()> {
        let mut resources = self.resources.lock().await;
        let resource = resources
            .get_mut(href)
            .ok_or_else(|| StoreError::NotFound(href.to_string()))?;
        resource.remove(name);
        Ok(())
    }

    async fn save(&self, href: Option<&str>, changes: &Properties) -> StoreResult<SavedResource> {
        let mut resources = self.resources.lock().await;
        let now = now_timestamp();

        let href = match href {
            Some(href) if resources.contains_key(href) => href.to_string(),
            Some(href) => return Err(StoreError::NotFound(href.to_string())),
            None => {
                let href = self.config.href_for(&uuid::Uuid::new_v4().to_string());
                let mut created = Properties::new();
                created.insert(CREATED_AT.name().to_string(), now.clone());
                resources.insert(href.clone(), created);
                href
            }
        };

        let resource = resources
            .get_mut(&href)
            .ok_or_else(|| StoreError::NotFound(href.clone()))?;
        for (name, value) in changes {
            resource.insert(name.clone(), value.clone());
        }
        resource.insert(MODIFIED_AT.name().to_string(), now);

        Ok(SavedResource {
            href,
            properties: resource.clone(),
        })
    }

    async fn delete_resource(&self, href: &str) -> StoreResult<()> {
        self.resources
            .lock()
            .await
            .remove(href)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(href.to_string()))
    }
}
