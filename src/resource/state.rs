//! Local property state of a single resource
//!
//! Keeps the last known remote mapping (base), the local overlay of
//! unsaved writes, and the set of names removed locally. Callers hold the
//! resource lock while touching it; nothing in here is synchronized.

use super::property::HREF_PROP_NAME;
use super::Properties;
use crate::store::SavedResource;
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct PropertyState {
    href: Option<String>,
    /// Last state fetched from, or persisted to, the remote store
    properties: Properties,
    /// Local writes not yet saved, shadowing `properties`
    dirty_properties: Properties,
    /// Local removals not yet reconciled, hiding both maps
    deleted_property_names: BTreeSet<String>,
    materialized: bool,
}

impl PropertyState {
    /// A resource that does not exist remotely yet
    pub fn unsaved() -> Self {
        Self {
            materialized: true,
            ..Default::default()
        }
    }

    /// A reference to a remote resource whose properties are not loaded
    pub fn for_href(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            ..Default::default()
        }
    }

    /// A resource loaded with an initial mapping.
    ///
    /// A mapping holding nothing but the href is only a reference and still
    /// needs to be materialized.
    pub fn with_properties(mut properties: Properties) -> Self {
        let href = take_href(&mut properties);
        let materialized = href.is_none() || !properties.is_empty();
        Self {
            href,
            properties,
            materialized,
            ..Default::default()
        }
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    pub fn is_dirty(&self) -> bool {
        self.has_new_properties() || self.has_removed_properties()
    }

    pub fn has_new_properties(&self) -> bool {
        !self.dirty_properties.is_empty()
    }

    pub fn has_removed_properties(&self) -> bool {
        !self.deleted_property_names.is_empty()
    }

    pub fn dirty_properties(&self) -> &Properties {
        &self.dirty_properties
    }

    pub fn is_deleted(&self, name: &str) -> bool {
        self.deleted_property_names.contains(name)
    }

    /// Whether `name` can be answered without loading the base mapping
    pub fn is_locally_known(&self, name: &str) -> bool {
        self.is_deleted(name) || self.dirty_properties.contains_key(name)
    }

    /// Install a freshly fetched mapping as the base
    pub fn apply_fetched(&mut self, mut fetched: Properties) {
        if let Some(href) = take_href(&mut fetched) {
            self.href.get_or_insert(href);
        }
        self.properties = fetched;
        self.materialized = true;
    }

    /// Fold a successful save back into the base and drop the overlay
    pub fn apply_saved(&mut self, saved: SavedResource) {
        let SavedResource { href, mut properties } = saved;
        take_href(&mut properties);
        self.href = Some(href);
        self.properties = properties;
        self.dirty_properties.clear();
        self.materialized = true;
    }

    /// Visible value: deletion hides, overlay shadows base
    pub fn read_property(&self, name: &str) -> Option<&Value> {
        if self.is_deleted(name) {
            return None;
        }
        self.dirty_properties
            .get(name)
            .or_else(|| self.properties.get(name))
    }

    /// Write a value and return the previously visible one.
    ///
    /// Writing always supersedes a pending local removal. With `mark_dirty`
    /// unset the value goes straight into the base mapping and is not
    /// tracked for the next save.
    pub fn set_property(&mut self, name: String, value: Value, mark_dirty: bool) -> Option<Value> {
        let was_deleted = self.deleted_property_names.remove(&name);
        let previous = if mark_dirty {
            let overlaid = self.dirty_properties.insert(name.clone(), value);
            overlaid.or_else(|| self.properties.get(&name).cloned())
        } else {
            self.dirty_properties.remove(&name);
            self.properties.insert(name, value)
        };
        if was_deleted {
            None
        } else {
            previous
        }
    }

    /// Record a local removal, returning the unsaved overlay value if any
    pub fn remove_property(&mut self, name: &str) -> Option<Value> {
        let previous = self.dirty_properties.remove(name);
        self.deleted_property_names.insert(name.to_string());
        previous
    }

    /// Drop an unsaved local value without recording a removal
    pub fn discard_local(&mut self, name: &str) -> Option<Value> {
        self.dirty_properties.remove(name)
    }

    pub fn deleted_snapshot(&self) -> Vec<String> {
        self.deleted_property_names.iter().cloned().collect()
    }

    /// The remote side no longer has `name`
    pub fn confirm_deleted(&mut self, name: &str) {
        self.properties.remove(name);
        self.deleted_property_names.remove(name);
    }

    /// (base ∪ overlay) − deleted
    pub fn visible_keys(&self) -> BTreeSet<String> {
        self.properties
            .keys()
            .chain(self.dirty_properties.keys())
            .filter(|name| !self.is_deleted(name))
            .cloned()
            .collect()
    }

    pub fn is_visible(&self, name: &str) -> bool {
        !self.is_deleted(name)
            && (self.dirty_properties.contains_key(name) || self.properties.contains_key(name))
    }
}

fn take_href(properties: &mut Properties) -> Option<String> {
    match properties.remove(HREF_PROP_NAME) {
        Some(Value::String(href)) => Some(href),
        _ => None,
    }
}
