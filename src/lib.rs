//! Custom data - lazily materialized property cache
//!
//! Map-like access to the custom data of a remote resource. Properties are
//! fetched from the remote store on first use, local writes and removals are
//! tracked separately from the remote state, and `save` sends the minimal set
//! of remote deletes and writes to reconcile them.
//!
//! # Architecture
//!
//! - **resource**: raw property state and reserved descriptors (`href`,
//!   `createdAt`, `modifiedAt`)
//! - **store**: the [`RemoteStore`] boundary plus an in-memory implementation
//! - **cache**: [`CustomData`], the concurrency-safe cache itself
//!
//! # Example
//!
//! ```rust,ignore
//! use custom_data::{CustomData, InMemoryStore, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::new(StoreConfig::default()));
//! let data = CustomData::new(store);
//!
//! data.put("favoriteColor", "blue").await;
//! assert_eq!(data.size().await?, 1);
//!
//! // Creates the resource remotely and mints its href
//! data.save().await?;
//! ```

// Local property state and descriptors
pub mod resource;

// Remote store boundary
pub mod store;

// Custom data cache
pub mod cache;

// Configuration
pub mod config;

// Error types
pub mod error;

// Re-export cache types
pub use cache::CustomData;

// Re-export store types
pub use store::{InMemoryStore, RemoteStore, SavedResource, StoreResult};

// Re-export resource types
pub use resource::{DateProperty, Properties, CREATED_AT, HREF_PROP_NAME, MODIFIED_AT};

pub use config::StoreConfig;

// Re-export error types
pub use error::{CustomDataError, Result, StoreError};
