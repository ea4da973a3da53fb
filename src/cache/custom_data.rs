//! Lazily materialized custom data of a remote resource
//!
//! Reads resolve through three layers: local removals hide a name, local
//! writes shadow the base mapping, and the base mapping mirrors the remote
//! store. The base is fetched on first access that needs the full key space.
//! `save` pushes removals first and then the written values.

use crate::config::StoreConfig;
use crate::error::{CustomDataError, Result};
use crate::resource::{
    DateProperty, Properties, PropertyState, CREATED_AT, HREF_PROP_NAME, MODIFIED_AT,
    PROPERTY_DESCRIPTORS,
};
use crate::store::RemoteStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Map-like custom data cache
///
/// All state sits behind one reader/writer lock. Reads share it; writes,
/// materialization and remote reconciliation hold it exclusively, including
/// across the awaited store call.
///
/// # Example
///
/// ```rust,ignore
/// use custom_data::{CustomData, InMemoryStore};
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryStore::default());
/// let data = CustomData::from_href(store, "http://localhost:8080/customData/abc");
///
/// data.put("color", "blue").await;
/// data.remove("size").await;
///
/// // Deletes `size` remotely, then pushes `color`
/// data.save().await?;
/// ```
pub struct CustomData {
    store: Arc<dyn RemoteStore>,
    /// Names `clear()` never touches
    reserved: BTreeSet<String>,
    state: RwLock<PropertyState>,
}

impl CustomData {
    fn with_state(store: Arc<dyn RemoteStore>, state: PropertyState) -> Self {
        let mut reserved: BTreeSet<String> = PROPERTY_DESCRIPTORS
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        reserved.insert(HREF_PROP_NAME.to_string());

        Self {
            store,
            reserved,
            state: RwLock::new(state),
        }
    }

    /// Custom data for a resource that does not exist remotely yet
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self::with_state(store, PropertyState::unsaved())
    }

    /// Reference to remote custom data, loaded on first use
    pub fn from_href(store: Arc<dyn RemoteStore>, href: impl Into<String>) -> Self {
        Self::with_state(store, PropertyState::for_href(href))
    }

    /// Custom data loaded with an initial property mapping
    pub fn with_properties(store: Arc<dyn RemoteStore>, properties: Properties) -> Self {
        Self::with_state(store, PropertyState::with_properties(properties))
    }

    /// Extend the reserved names with the configured ones
    pub fn with_config(mut self, config: &StoreConfig) -> Self {
        self.reserved.extend(config.reserved_properties.iter().cloned());
        self
    }

    pub fn reserved_property_names(&self) -> &BTreeSet<String> {
        &self.reserved
    }

    pub async fn href(&self) -> Option<String> {
        self.state.read().await.href().map(str::to_owned)
    }

    pub async fn is_materialized(&self) -> bool {
        self.state.read().await.is_materialized()
    }

    /// Load the base mapping from the store if it is not loaded yet.
    ///
    /// The fetch happens at most once. A failed fetch leaves the cache
    /// unmaterialized so the next call tries again.
    pub async fn materialize(&self) -> Result<()> {
        let materialized = self.state.read().await.is_materialized();
        if materialized {
            return Ok(());
        }

        let mut state = self.state.write().await;
        // Another task may have won the race between the two locks
        if state.is_materialized() {
            return Ok(());
        }

        let href = state
            .href()
            .ok_or(CustomDataError::MissingHref("materialize"))?
            .to_string();
        debug!(%href, "Materializing custom data");
        let fetched = self.store.fetch_properties(&href).await?;
        debug!(%href, count = fetched.len(), "Custom data materialized");
        state.apply_fetched(fetched);
        Ok(())
    }

    // === Map operations ===

    pub async fn size(&self) -> Result<usize> {
        self.materialize().await?;
        Ok(self.state.read().await.visible_keys().len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.size().await? == 0)
    }

    pub async fn contains_key(&self, key: &str) -> Result<bool> {
        self.materialize().await?;
        Ok(self.state.read().await.is_visible(key))
    }

    /// Structural equality against every visible value
    pub async fn contains_value(&self, value: &Value) -> Result<bool> {
        let entries = self.entry_set().await?;
        Ok(entries.values().any(|v| v == value))
    }

    /// Visible value of `key`, `None` when unset or removed
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        {
            let state = self.state.read().await;
            if state.is_materialized() || state.is_locally_known(key) {
                return Ok(state.read_property(key).cloned());
            }
        }

        self.materialize().await?;
        Ok(self.state.read().await.read_property(key).cloned())
    }

    /// [`get`](Self::get) for keys that arrive as loosely typed JSON
    pub async fn get_dynamic(&self, key: &Value) -> Result<Option<Value>> {
        self.get(string_key(key)?).await
    }

    /// Write a value locally, returning the previously visible one.
    ///
    /// Supersedes any pending removal of `key`. Does not fetch: the previous
    /// value comes from what is known locally.
    pub async fn put(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.state
            .write()
            .await
            .set_property(key.into(), value.into(), true)
    }

    /// Mark `key` removed, returning its unsaved local value if any.
    ///
    /// The removal is recorded whether or not the remote side has the key.
    /// On a resource that was never saved there is no remote side, so the
    /// next `save` drops the removal without calling the store.
    ///
    /// Reserved names are never tracked for deletion: removing one only
    /// discards its unsaved local value and leaves the known value visible.
    pub async fn remove(&self, key: &str) -> Option<Value> {
        let mut state = self.state.write().await;
        if self.reserved.contains(key) {
            debug!(property = %key, "Ignoring removal of reserved property");
            return state.discard_local(key);
        }
        state.remove_property(key)
    }

    /// [`remove`](Self::remove) for keys that arrive as loosely typed JSON
    pub async fn remove_dynamic(&self, key: &Value) -> Result<Option<Value>> {
        let key = string_key(key)?;
        Ok(self.remove(key).await)
    }

    /// Apply several writes in one critical section
    pub async fn put_all<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let entries: Vec<(String, Value)> = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        if entries.is_empty() {
            return;
        }

        let mut state = self.state.write().await;
        for (key, value) in entries {
            state.set_property(key, value, true);
        }
    }

    /// Mark every visible, non-reserved name removed.
    ///
    /// Reserved names survive. Nothing reaches the store until `save`.
    pub async fn clear(&self) -> Result<()> {
        self.materialize().await?;

        let mut state = self.state.write().await;
        let doomed: Vec<String> = state
            .visible_keys()
            .into_iter()
            .filter(|name| !self.reserved.contains(name))
            .collect();
        debug!(count = doomed.len(), "Clearing custom data");
        for name in &doomed {
            state.remove_property(name);
        }
        Ok(())
    }

    /// Visible names, as an owned snapshot
    pub async fn key_set(&self) -> Result<BTreeSet<String>> {
        self.materialize().await?;
        Ok(self.state.read().await.visible_keys())
    }

    pub async fn property_names(&self) -> Result<BTreeSet<String>> {
        self.key_set().await
    }

    pub async fn values(&self) -> Result<Vec<Value>> {
        Ok(self.entry_set().await?.into_iter().map(|(_, v)| v).collect())
    }

    pub async fn entry_set(&self) -> Result<Properties> {
        self.materialize().await?;

        let state = self.state.read().await;
        let entries = state
            .visible_keys()
            .into_iter()
            .filter_map(|name| {
                let value = state.read_property(&name).cloned()?;
                Some((name, value))
            })
            .collect();
        Ok(entries)
    }

    // === Reserved properties ===

    pub async fn created_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.date_property(&CREATED_AT).await
    }

    pub async fn modified_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.date_property(&MODIFIED_AT).await
    }

    async fn date_property(&self, property: &DateProperty) -> Result<Option<DateTime<Utc>>> {
        let value = self.get(property.name()).await?;
        property.parse(value.as_ref())
    }

    // === Dirty tracking ===

    pub async fn is_dirty(&self) -> bool {
        self.state.read().await.is_dirty()
    }

    pub async fn has_removed_properties(&self) -> bool {
        self.state.read().await.has_removed_properties()
    }

    pub async fn has_new_properties(&self) -> bool {
        self.state.read().await.has_new_properties()
    }

    // === Remote reconciliation ===

    /// Push local changes to the store.
    ///
    /// Does nothing when clean. Removals are reconciled before written
    /// values are saved; a failure stops the save and leaves whatever is
    /// still pending in place for the next attempt.
    ///
    /// A resource without an href (built with [`new`](Self::new) and never
    /// saved) has nothing to delete remotely: its pending removals are
    /// dropped locally and no delete call is issued.
    pub async fn save(&self) -> Result<()> {
        if !self.is_dirty().await {
            return Ok(());
        }

        let mut state = self.state.write().await;
        if state.has_removed_properties() {
            self.reconcile_deletions(&mut state).await?;
        }
        if state.has_new_properties() {
            let changes = state.dirty_properties().clone();
            debug!(href = ?state.href(), count = changes.len(), "Saving custom data");
            let saved = self.store.save(state.href(), &changes).await?;
            state.apply_saved(saved);
        }
        Ok(())
    }

    /// Delete locally removed names from the store
    pub async fn delete_removed_properties(&self) -> Result<()> {
        let mut state = self.state.write().await;
        self.reconcile_deletions(&mut state).await
    }

    async fn reconcile_deletions(&self, state: &mut PropertyState) -> Result<()> {
        let names = state.deleted_snapshot();

        let Some(href) = state.href().map(str::to_owned) else {
            // Never persisted, nothing to delete remotely
            for name in &names {
                state.confirm_deleted(name);
            }
            return Ok(());
        };

        for name in names {
            if let Err(error) = self.store.delete_property(&href, &name).await {
                warn!(%href, property = %name, %error, "Remote property delete failed, keeping it pending");
                return Err(error.into());
            }
            state.confirm_deleted(&name);
            debug!(%href, property = %name, "Deleted remote property");
        }
        Ok(())
    }

    /// Delete the whole resource from the store
    pub async fn delete(&self) -> Result<()> {
        let state = self.state.write().await;
        let href = state.href().ok_or(CustomDataError::MissingHref("delete"))?;
        self.store.delete_resource(href).await?;
        info!(%href, "Deleted custom data");
        Ok(())
    }
}

fn string_key(key: &Value) -> Result<&str> {
    key.as_str().ok_or_else(|| {
        CustomDataError::InvalidArgument(format!("property name must be a string, got {}", key))
    })
}
