// ============================
// backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! Sessions live in the document store with a TTL. Each successful
//! validation pushes the expiry out again, so a session ends only after a
//! full TTL of inactivity.
use crate::error::AppError;
use crate::storage::DocumentStore;
use blog_common::{Document, Pid, Session, SessionId};
use metrics::counter;
use std::{sync::Arc, time::Duration};
use uuid::Uuid;

/// Session TTL (time to live)
pub const SESSION_TTL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Session manager for handling authentication tokens
pub struct SessionManager<S> {
    store: Arc<S>,
    ttl: Duration,
}

impl<S: DocumentStore> SessionManager<S> {
    /// Create a new session manager
    pub fn new(store: Arc<S>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a new session for `pid` and return its token
    pub async fn issue(&self, pid: Pid) -> Result<SessionId, AppError> {
        let id = Uuid::new_v4();
        let session = Document::Session(Session { id, pid });

        self.store
            .insert(&id.to_string(), serde_json::to_value(&session)?, Some(self.ttl))
            .await?;

        counter!(crate::metrics::SESSION_ISSUED).increment(1);
        tracing::debug!(%pid, "session issued");
        Ok(id)
    }

    /// Resolve a token to its pid, refreshing the session's expiry.
    ///
    /// The refresh is advisory: if it fails the request still proceeds and
    /// the session keeps its previous expiry.
    pub async fn validate(&self, token: &str) -> Result<Pid, AppError> {
        // Only session ids in their issued spelling are accepted; other
        // document keys never authenticate.
        let key = Uuid::parse_str(token)
            .map_err(|_| AppError::InvalidSession)?
            .to_string();
        if key != token {
            return Err(AppError::InvalidSession);
        }

        let stored = match self.store.get(&key).await {
            Ok(stored) => stored,
            Err(e) if e.is_not_found() => return Err(AppError::InvalidSession),
            Err(e) => return Err(e.into()),
        };

        let pid = match serde_json::from_value::<Document>(stored.value) {
            Ok(Document::Session(session)) => session.pid,
            _ => return Err(AppError::InvalidSession),
        };

        if let Err(e) = self.store.touch(&key, self.ttl).await {
            counter!(crate::metrics::SESSION_REFRESH_FAILED).increment(1);
            tracing::warn!(%pid, error = %e, "failed to refresh session expiry");
        }

        Ok(pid)
    }
}
