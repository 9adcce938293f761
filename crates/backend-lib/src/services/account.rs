// ============================
// backend-lib/src/services/account.rs
// ============================
//! Signup, account lookup and login.
//!
//! A signup writes two documents: the Profile (keyed by pid) and then the
//! Account (keyed by email). The Profile goes first so that a failed
//! Account insert can be undone by deleting it.
use crate::auth::{CredentialHasher, SessionManager};
use crate::error::AppError;
use crate::storage::{DocumentStore, StoredDocument};
use crate::validation::non_empty;
use blog_common::{Account, AccountCreated, Document, Pid, Profile, SessionId};
use metrics::counter;
use std::sync::Arc;
use uuid::Uuid;

pub struct AccountService<S> {
    store: Arc<S>,
    hasher: CredentialHasher,
    sessions: Arc<SessionManager<S>>,
}

impl<S: DocumentStore> AccountService<S> {
    pub fn new(store: Arc<S>, hasher: CredentialHasher, sessions: Arc<SessionManager<S>>) -> Self {
        Self {
            store,
            hasher,
            sessions,
        }
    }

    /// Create a Profile + Account pair for `email`.
    ///
    /// Fails with a storage error if the email is taken; in that case the
    /// freshly written Profile is removed again.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AccountCreated, AppError> {
        let email = non_empty(email, "email")?;
        let password = non_empty(password, "password")?;

        let pid = Uuid::new_v4();
        let hash = self.hash(password).await?;
        let profile = Document::Profile(Profile {
            email: email.to_string(),
        });
        let account = Document::Account(Account {
            pid,
            email: email.to_string(),
            password: hash,
        });

        let pid_key = pid.to_string();
        self.store
            .insert(&pid_key, serde_json::to_value(&profile)?, None)
            .await?;

        let inserted = match self
            .store
            .insert(email, serde_json::to_value(&account)?, None)
            .await
        {
            Ok(inserted) => inserted,
            Err(insert_err) => {
                counter!(crate::metrics::ACCOUNT_ROLLED_BACK).increment(1);
                return Err(match self.store.remove(&pid_key).await {
                    Ok(_) => {
                        tracing::warn!(%pid, error = %insert_err, "account creation failed, removed profile");
                        AppError::Storage(insert_err)
                    },
                    Err(source) => {
                        tracing::error!(
                            %pid,
                            insert_error = %insert_err,
                            rollback_error = %source,
                            "account creation failed and profile rollback failed; orphaned profile needs manual cleanup"
                        );
                        AppError::CompensationFailure { pid, source }
                    },
                });
            },
        };

        counter!(crate::metrics::ACCOUNT_CREATED).increment(1);
        tracing::info!(%pid, "account created");

        Ok(AccountCreated {
            pid,
            email: email.to_string(),
            cas: inserted.cas,
        })
    }

    /// Fetch the Profile for `pid`.
    pub async fn get_account(&self, pid: Pid) -> Result<Profile, AppError> {
        match self.load(&pid.to_string()).await? {
            Document::Profile(profile) => Ok(profile),
            _ => Err(AppError::NotFound(pid.to_string())),
        }
    }

    /// Raw store record for a profile key, as held by the store.
    ///
    /// Keys that hold anything other than a profile are reported as missing,
    /// so accounts and sessions cannot be read through this path.
    pub async fn get_profile_record(&self, pid: &str) -> Result<StoredDocument, AppError> {
        let stored = self.fetch(pid).await?;
        if stored.value.get("type").and_then(|kind| kind.as_str()) != Some("profile") {
            return Err(AppError::NotFound(pid.to_string()));
        }
        Ok(stored)
    }

    /// Check credentials and open a session.
    ///
    /// An unknown email and a wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionId, AppError> {
        let email = non_empty(email, "email")?;
        let password = non_empty(password, "password")?;

        let account = match self.load(email).await {
            Ok(Document::Account(account)) => account,
            Ok(_) | Err(AppError::NotFound(_)) => {
                counter!(crate::metrics::LOGIN_FAILED).increment(1);
                return Err(AppError::InvalidCredentials);
            },
            Err(e) => return Err(e),
        };

        if !self.verify(password, &account.password).await? {
            counter!(crate::metrics::LOGIN_FAILED).increment(1);
            tracing::info!(pid = %account.pid, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let sid = self.sessions.issue(account.pid).await?;
        counter!(crate::metrics::LOGIN_SUCCEEDED).increment(1);
        tracing::info!(pid = %account.pid, "login succeeded");
        Ok(sid)
    }

    async fn fetch(&self, key: &str) -> Result<StoredDocument, AppError> {
        self.store.get(key).await.map_err(|e| {
            if e.is_not_found() {
                AppError::NotFound(key.to_string())
            } else {
                e.into()
            }
        })
    }

    async fn load(&self, key: &str) -> Result<Document, AppError> {
        let stored = self.fetch(key).await?;
        Ok(serde_json::from_value(stored.value)?)
    }

    async fn hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password)).await?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = hash.to_string();
        Ok(tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await?)
    }
}
