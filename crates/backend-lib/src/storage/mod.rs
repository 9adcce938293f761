// ============================
// backend-lib/src/storage/mod.rs
// ============================
//! Document store abstraction with in-memory and flat-file implementations.
//!
//! The store is a key/value document database: each key maps to one JSON
//! document, optionally with an expiry. `insert` is insert-if-absent, which
//! is the only uniqueness guarantee the services rely on.

mod flat_file;
mod memory;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a [`DocumentStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {0}")]
    KeyNotFound(String),

    #[error("document already exists: {0}")]
    KeyExists(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound(_))
    }
}

/// A document together with its current revision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub cas: u64,
    pub value: Value,
}

/// Outcome of a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    pub cas: u64,
}

/// Equality filter over top-level document fields.
///
/// Values are bound separately from field names, so user input never
/// becomes part of the filter structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Value)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    /// Whether `document` satisfies every filter.
    pub fn matches(&self, document: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }
}

/// Contract consumed from the document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a live document.
    async fn get(&self, key: &str) -> Result<StoredDocument, StoreError>;

    /// Store `value` under `key`, failing with [`StoreError::KeyExists`]
    /// if a live document already holds the key.
    async fn insert(
        &self,
        key: &str,
        value: Value,
        expiry: Option<Duration>,
    ) -> Result<MutationResult, StoreError>;

    /// Delete a live document.
    async fn remove(&self, key: &str) -> Result<MutationResult, StoreError>;

    /// Reset the expiry of a live document to `expiry` from now.
    async fn touch(&self, key: &str, expiry: Duration) -> Result<MutationResult, StoreError>;

    /// All live documents matching `query`, in store order.
    async fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Drop expired documents, returning how many were removed.
    async fn purge_expired(&self) -> Result<usize, StoreError>;
}
