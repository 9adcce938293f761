// ============================
// backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the blog service: accounts, sessions
//! and posts over a document store.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod router;
pub mod services;
pub mod storage;
pub mod validation;

use crate::auth::SessionManager;
use crate::config::Settings;
use crate::services::{AccountService, BlogService};
use crate::storage::DocumentStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState<S> {
    /// Document store
    pub store: Arc<S>,
    /// Session manager
    pub sessions: Arc<SessionManager<S>>,
    /// Signup, login and profile lookups
    pub accounts: AccountService<S>,
    /// Blog posts
    pub blogs: BlogService<S>,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl<S: DocumentStore> AppState<S> {
    /// Create a new application state around an opened store
    pub fn new(store: S, settings: Settings) -> anyhow::Result<Self> {
        settings.validate()?;

        let store = Arc::new(store);
        let sessions = Arc::new(SessionManager::new(store.clone(), settings.session_ttl()));
        let accounts = AccountService::new(store.clone(), settings.hasher()?, sessions.clone());
        let blogs = BlogService::new(store.clone());

        Ok(Self {
            store,
            sessions,
            accounts,
            blogs,
            settings: Arc::new(settings),
        })
    }
}
