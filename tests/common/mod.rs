//! Shared helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use custom_data::{InMemoryStore, Properties, RemoteStore, SavedResource, StoreError, StoreResult};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HREF: &str = "http://localhost:8080/customData/0a1b2c";

/// A remote call as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch(String),
    DeleteProperty(String),
    Save(Properties),
    DeleteResource(String),
}

/// In-memory store that records every call and fails on demand
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<Call>>,
    failing_deletes: Mutex<HashSet<String>>,
    failing_fetches: AtomicUsize,
    fail_saves: AtomicBool,
    fetch_delay: Mutex<Option<Duration>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::default(),
            calls: Mutex::new(Vec::new()),
            failing_deletes: Mutex::new(HashSet::new()),
            failing_fetches: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
            fetch_delay: Mutex::new(None),
        }
    }

    /// Store seeded with one resource at [`HREF`]
    pub async fn seeded(properties: Value) -> Self {
        let store = Self::new();
        store.inner.insert(HREF, props(properties)).await;
        store
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    pub fn deleted_properties(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::DeleteProperty(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn saves(&self) -> Vec<Properties> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Save(changes) => Some(changes),
                _ => None,
            })
            .collect()
    }

    pub fn fail_delete_of(&self, name: &str) {
        self.failing_deletes.lock().unwrap().insert(name.to_string());
    }

    pub fn heal_deletes(&self) {
        self.failing_deletes.lock().unwrap().clear();
    }

    pub fn fail_next_fetches(&self, count: usize) {
        self.failing_fetches.store(count, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn delay_fetches(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = Some(delay);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn fetch_properties(&self, href: &str) -> StoreResult<Properties> {
        self.record(Call::Fetch(href.to_string()));
        let delay = *self.fetch_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let pending = self.failing_fetches.load(Ordering::SeqCst);
        if pending > 0 {
            self.failing_fetches.store(pending - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }
        self.inner.fetch_properties(href).await
    }

    async fn delete_property(&self, href: &str, name: &str) -> StoreResult<()> {
        self.record(Call::DeleteProperty(name.to_string()));
        let failing = self.failing_deletes.lock().unwrap().contains(name);
        if failing {
            return Err(StoreError::Rejected {
                status: 503,
                message: format!("injected delete failure for {}", name),
            });
        }
        self.inner.delete_property(href, name).await
    }

    async fn save(&self, href: Option<&str>, changes: &Properties) -> StoreResult<SavedResource> {
        self.record(Call::Save(changes.clone()));
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        self.inner.save(href, changes).await
    }

    async fn delete_resource(&self, href: &str) -> StoreResult<()> {
        self.record(Call::DeleteResource(href.to_string()));
        self.inner.delete_resource(href).await
    }
}

pub fn props(value: Value) -> Properties {
    value.as_object().cloned().expect("object literal")
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custom_data=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
