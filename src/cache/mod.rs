//! Caching primitives for remote resource properties
//!
//! Provides the lazily materialized custom data cache that tracks local
//! writes and removals until they are saved.

mod custom_data;

pub use custom_data::CustomData;
