//! Generic resource property plumbing
//!
//! The narrow get/set/delete contract the custom data cache builds on,
//! plus the typed descriptors for reserved fields.

mod property;
mod state;

pub use property::{DateProperty, CREATED_AT, HREF_PROP_NAME, MODIFIED_AT, PROPERTY_DESCRIPTORS};
pub use state::PropertyState;

/// Raw property mapping of a resource
pub type Properties = serde_json::Map<String, serde_json::Value>;
