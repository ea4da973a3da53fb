//! Store and cache configuration

use crate::error::{CustomDataError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by the cache and the in-memory store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL that resource hrefs are minted under
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Collection segment for custom data resources
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Extra property names that `clear()` must leave alone
    #[serde(default)]
    pub reserved_properties: Vec<String>,
}

fn default_base_url() -> String { "http://localhost:8080".to_string() }
fn default_collection() -> String { "customData".to_string() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            collection: default_collection(),
            reserved_properties: Vec::new(),
        }
    }
}

impl StoreConfig {
    /// Parse a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: StoreConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CustomDataError::Config("base_url must not be empty".into()));
        }
        if self.collection.trim().is_empty() || self.collection.contains('/') {
            return Err(CustomDataError::Config(format!(
                "invalid collection name: {:?}",
                self.collection
            )));
        }
        if let Some(name) = self.reserved_properties.iter().find(|n| n.is_empty()) {
            return Err(CustomDataError::Config(format!(
                "reserved property names must not be empty: {:?}",
                name
            )));
        }
        Ok(())
    }

    /// Href for a resource id in this collection
    pub fn href_for(&self, id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.collection,
            id
        )
    }
}
