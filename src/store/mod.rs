//! Remote resource store abstraction
//!
//! The cache never talks to the network itself. Everything it needs from the
//! authoritative side goes through [`RemoteStore`], which implementations back
//! with HTTP, a database, or memory.

mod memory;

pub use memory::InMemoryStore;

use crate::error::StoreError;
use crate::resource::Properties;
use async_trait::async_trait;

/// Result of a store call
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Outcome of persisting a resource
#[derive(Debug, Clone, PartialEq)]
pub struct SavedResource {
    /// Identity of the persisted resource (minted on first save)
    pub href: String,
    /// Full property set as the store now holds it
    pub properties: Properties,
}

/// Authoritative store behind a custom data cache.
///
/// Every call may block on I/O. Timeouts and retries are the
/// implementation's business; the cache only propagates failures.
///
/// Used as `Arc<dyn RemoteStore>`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Load the complete property mapping of a resource.
    async fn fetch_properties(&self, href: &str) -> StoreResult<Properties>;

    /// Remove one property from a resource.
    ///
    /// Deleting a property the resource does not have must succeed.
    async fn delete_property(&self, href: &str, name: &str) -> StoreResult<()>;

    /// Push changed properties, creating the resource when `href` is `None`.
    async fn save(&self, href: Option<&str>, changes: &Properties) -> StoreResult<SavedResource>;

    /// Remove the whole resource.
    async fn delete_resource(&self, href: &str) -> StoreResult<()>;
}
