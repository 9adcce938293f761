// ============================
// backend-lib/src/storage/flat_file.rs
// ============================
//! Flat-file document store: one JSON file per key.
use super::{DocumentStore, MutationResult, Query, StoreError, StoredDocument};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::fs as tokio_fs;

/// On-disk form of a document.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    cas: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    value: Value,
}

impl Envelope {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

fn expiry_from_now(ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl).ok().map(|ttl| Utc::now() + ttl)
}

/// What a document file held when read.
enum OnDisk {
    Missing,
    Unreadable,
    Present(Envelope),
}

/// Document store persisting under `<root>/documents`.
///
/// Keys are base64url-encoded into file names, so any key is safe to use.
#[derive(Debug)]
pub struct FlatFileStore {
    root: PathBuf,
    next_cas: AtomicU64,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().join("documents");
        std::fs::create_dir_all(&root)?;
        // Seed from the clock so revisions keep increasing across restarts.
        let seed = u64::try_from(Utc::now().timestamp_micros()).unwrap_or_default();
        Ok(Self {
            root,
            next_cas: AtomicU64::new(seed),
        })
    }

    fn cas(&self) -> u64 {
        self.next_cas.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", URL_SAFE_NO_PAD.encode(key)))
    }

    async fn read_envelope(&self, path: &Path) -> Result<OnDisk, StoreError> {
        let bytes = match tokio_fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(OnDisk::Missing),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(envelope) => Ok(OnDisk::Present(envelope)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable document file");
                Ok(OnDisk::Unreadable)
            },
        }
    }

    /// Read a live envelope. Expired and unreadable files are deleted.
    async fn read_live(&self, key: &str) -> Result<Envelope, StoreError> {
        let path = self.path_for(key);
        match self.read_envelope(&path).await? {
            OnDisk::Present(envelope) if !envelope.is_expired(Utc::now()) => Ok(envelope),
            OnDisk::Present(_) | OnDisk::Unreadable => {
                remove_if_present(&path).await?;
                Err(StoreError::KeyNotFound(key.to_string()))
            },
            OnDisk::Missing => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    /// Link a fully written temp file into place, failing if a live document
    /// already holds the key. Returns `false` on collision.
    async fn publish(&self, tmp: &Path, path: &Path) -> Result<bool, StoreError> {
        // A stale expired or unreadable file must not block the key; clear it once and retry.
        for attempt in 0..2 {
            match tokio_fs::hard_link(tmp, path).await {
                Ok(()) => return Ok(true),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt == 0 => {
                    match self.read_envelope(path).await? {
                        OnDisk::Present(existing) if !existing.is_expired(Utc::now()) => break,
                        _ => remove_if_present(path).await?,
                    }
                },
                Err(e) if e.kind() == ErrorKind::AlreadyExists => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(false)
    }

    /// Replace the file for `key` atomically via a sibling temp file.
    async fn overwrite(&self, key: &str, envelope: &Envelope) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = temp_path(&path, envelope.cas);
        tokio_fs::write(&tmp, serde_json::to_vec(envelope)?).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn temp_path(path: &Path, cas: u64) -> PathBuf {
    path.with_extension(format!("tmp-{cas}"))
}

async fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match tokio_fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl DocumentStore for FlatFileStore {
    async fn get(&self, key: &str) -> Result<StoredDocument, StoreError> {
        let envelope = self.read_live(key).await?;
        Ok(StoredDocument {
            cas: envelope.cas,
            value: envelope.value,
        })
    }

    async fn insert(
        &self,
        key: &str,
        value: Value,
        expiry: Option<Duration>,
    ) -> Result<MutationResult, StoreError> {
        let path = self.path_for(key);
        let envelope = Envelope {
            cas: self.cas(),
            expires_at: expiry.and_then(expiry_from_now),
            value,
        };
        let tmp = temp_path(&path, envelope.cas);

        // Readers only ever see the path once the temp file is complete.
        if let Err(e) = tokio_fs::write(&tmp, serde_json::to_vec(&envelope)?).await {
            remove_if_present(&tmp).await?;
            return Err(e.into());
        }
        let published = self.publish(&tmp, &path).await;
        if let Err(e) = remove_if_present(&tmp).await {
            tracing::warn!(path = %tmp.display(), error = %e, "failed to remove temp file");
        }

        if published? {
            Ok(MutationResult { cas: envelope.cas })
        } else {
            Err(StoreError::KeyExists(key.to_string()))
        }
    }

    async fn remove(&self, key: &str) -> Result<MutationResult, StoreError> {
        self.read_live(key).await?;
        match tokio_fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(MutationResult { cas: self.cas() }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::KeyNotFound(key.to_string()))
            },
            Err(e) => Err(e.into()),
        }
    }

    async fn touch(&self, key: &str, expiry: Duration) -> Result<MutationResult, StoreError> {
        let mut envelope = self.read_live(key).await?;
        envelope.cas = self.cas();
        envelope.expires_at = expiry_from_now(expiry);
        self.overwrite(key, &envelope).await?;
        Ok(MutationResult { cas: envelope.cas })
    }

    async fn query(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let now = Utc::now();
        let mut matches = Vec::new();
        let mut entries = tokio_fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            // Files removed between listing and reading, or unreadable, are skipped.
            let OnDisk::Present(envelope) = self.read_envelope(&path).await? else {
                continue;
            };
            if !envelope.is_expired(now) && query.matches(&envelope.value) {
                matches.push(envelope.value);
            }
        }

        Ok(matches)
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut removed = 0;
        let mut entries = tokio_fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let purge = match self.read_envelope(&path).await? {
                OnDisk::Present(envelope) => envelope.is_expired(now),
                OnDisk::Unreadable => true,
                OnDisk::Missing => false,
            };
            if purge {
                remove_if_present(&path).await?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}
