//! Test utilities for backend-lib integration tests
//!
//! Provides cheap settings, a ready-made application state and a store
//! wrapper that injects failures into chosen operations.
#![allow(dead_code)]

use async_trait::async_trait;
use backend_lib::{
    config::Settings,
    storage::{DocumentStore, MemoryStore, MutationResult, Query, StoreError, StoredDocument},
    AppState,
};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Settings with scrypt parameters small enough for debug-build tests
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.password_hashing.log_n = 4;
    settings
}

/// Application state over a fresh in-memory store
pub fn memory_state() -> Arc<AppState<MemoryStore>> {
    Arc::new(AppState::new(MemoryStore::new(), test_settings()).expect("app state"))
}

/// Memory store that can be told to fail specific operations.
///
/// `fail_insert_containing` makes inserts fail for keys containing the given
/// pattern; the other switches fail every call of that kind.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_insert_containing: Option<String>,
    pub fail_remove: AtomicBool,
    pub fail_touch: AtomicBool,
    pub fail_get: AtomicBool,
}

impl FlakyStore {
    pub fn failing_inserts_for(pattern: &str) -> Self {
        Self {
            fail_insert_containing: Some(pattern.to_string()),
            ..Self::default()
        }
    }

    fn unavailable(op: &str) -> StoreError {
        StoreError::Unavailable(format!("{op} rejected by test"))
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<StoredDocument, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::unavailable("get"));
        }
        self.inner.get(key).await
    }

    async fn insert(
        &self,
        key: &str,
        value: Value,
        expiry: Option<Duration>,
    ) -> Result<MutationResult, StoreError> {
        if let Some(pattern) = &self.fail_insert_containing {
            if key.contains(pattern.as_str()) {
                return Err(Self::unavailable("insert"));
            }
        }
        self.inner.insert(key, value, expiry).await
    }

    async fn remove(&self, key: &str) -> Result<MutationResult, StoreError> {
        if self.fail_remove.load(Ordering::SeqCst) {
            return Err(Self::unavailable("remove"));
        }
        self.inner.remove(key).await
    }

    async fn touch(&self, key: &str, expiry: Duration) -> Result<MutationResult, StoreError> {
        if self.fail_touch.load(Ordering::SeqCst) {
            return Err(Self::unavailable("touch"));
        }
        self.inner.touch(key, expiry).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        self.inner.query(query).await
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        self.inner.purge_expired().await
    }
}

/// All profile documents registered for `email`
pub async fn profiles_for<S: DocumentStore>(store: &S, email: &str) -> Vec<Value> {
    store
        .query(&Query::new().field_eq("type", "profile").field_eq("email", email))
        .await
        .expect("profile query")
}
