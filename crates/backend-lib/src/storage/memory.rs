//! In-process document store.
use super::{DocumentStore, MutationResult, Query, StoreError, StoredDocument};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Slot {
    cas: u64,
    value: Value,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Document store backed by a concurrent map.
///
/// Expiry uses the tokio clock, so tests can drive TTLs with a paused
/// runtime.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, Slot>,
    next_cas: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cas(&self) -> u64 {
        self.next_cas.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of documents held, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<StoredDocument, StoreError> {
        let now = Instant::now();
        if let Some(slot) = self.documents.get(key) {
            if !slot.is_expired(now) {
                return Ok(StoredDocument {
                    cas: slot.cas,
                    value: slot.value.clone(),
                });
            }
        }
        self.documents.remove_if(key, |_, slot| slot.is_expired(now));
        Err(StoreError::KeyNotFound(key.to_string()))
    }

    async fn insert(
        &self,
        key: &str,
        value: Value,
        expiry: Option<Duration>,
    ) -> Result<MutationResult, StoreError> {
        let now = Instant::now();
        let slot = Slot {
            cas: self.cas(),
            value,
            expires_at: expiry.map(|ttl| now + ttl),
        };
        let cas = slot.cas;

        match self.documents.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().is_expired(now) {
                    return Err(StoreError::KeyExists(key.to_string()));
                }
                occupied.insert(slot);
            },
            Entry::Vacant(vacant) => {
                vacant.insert(slot);
            },
        }

        Ok(MutationResult { cas })
    }

    async fn remove(&self, key: &str) -> Result<MutationResult, StoreError> {
        let now = Instant::now();
        match self.documents.remove(key) {
            Some((_, slot)) if !slot.is_expired(now) => Ok(MutationResult { cas: self.cas() }),
            _ => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    async fn touch(&self, key: &str, expiry: Duration) -> Result<MutationResult, StoreError> {
        let now = Instant::now();
        let cas = self.cas();
        match self.documents.get_mut(key) {
            Some(mut slot) if !slot.is_expired(now) => {
                slot.expires_at = Some(now + expiry);
                slot.cas = cas;
                Ok(MutationResult { cas })
            },
            _ => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let now = Instant::now();
        Ok(self
            .documents
            .iter()
            .filter(|slot| !slot.is_expired(now) && query.matches(&slot.value))
            .map(|slot| slot.value.clone())
            .collect())
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Instant::now();
        let before = self.documents.len();
        self.documents.retain(|_, slot| !slot.is_expired(now));
        Ok(before.saturating_sub(self.documents.len()))
    }
}
