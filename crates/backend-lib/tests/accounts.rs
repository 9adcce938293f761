// =========================
// tests/accounts.rs
// =========================
//! Signup, rollback and login behavior of the account service
mod common;

use backend_lib::{error::AppError, storage::DocumentStore, AppState};
use common::{memory_state, profiles_for, test_settings, FlakyStore};
use std::sync::atomic::Ordering;
use uuid::Uuid;

#[tokio::test]
async fn test_create_then_login() {
    let state = memory_state();

    let created = state.accounts.create_account("a@x.com", "p").await.unwrap();
    assert_eq!(created.email, "a@x.com");

    let sid = state.accounts.login("a@x.com", "p").await.unwrap();
    assert!(!sid.is_nil());
    assert_eq!(state.sessions.validate(&sid.to_string()).await.unwrap(), created.pid);
}

#[tokio::test]
async fn test_stored_account_holds_only_a_hash() {
    let state = memory_state();
    let created = state.accounts.create_account("a@x.com", "plaintext").await.unwrap();

    let account = state.store.get("a@x.com").await.unwrap().value;
    assert_eq!(account["type"], "account");
    assert_eq!(account["pid"], created.pid.to_string());
    assert_ne!(account["password"], "plaintext");

    let profile = state.store.get(&created.pid.to_string()).await.unwrap().value;
    assert_eq!(profile, serde_json::json!({ "type": "profile", "email": "a@x.com" }));
}

#[tokio::test]
async fn test_wrong_password_never_issues_session() {
    let state = memory_state();
    state.accounts.create_account("a@x.com", "right").await.unwrap();

    let err = state.accounts.login("a@x.com", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));

    let sessions = state
        .store
        .query(&backend_lib::storage::Query::new().field_eq("type", "session"))
        .await
        .unwrap();
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_unknown_email_looks_like_wrong_password() {
    let state = memory_state();

    let err = state.accounts.login("nobody@x.com", "p").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_missing_fields() {
    let state = memory_state();

    assert!(matches!(
        state.accounts.create_account("", "p").await,
        Err(AppError::MissingField("email"))
    ));
    assert!(matches!(
        state.accounts.create_account("a@x.com", "").await,
        Err(AppError::MissingField("password"))
    ));
    assert!(matches!(
        state.accounts.login("a@x.com", "").await,
        Err(AppError::MissingField("password"))
    ));
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn test_duplicate_email_rolls_back_profile() {
    let state = memory_state();
    let first = state.accounts.create_account("a@x.com", "p").await.unwrap();

    let err = state.accounts.create_account("a@x.com", "other").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    // only the first signup's profile survives
    let profiles = profiles_for(&*state.store, "a@x.com").await;
    assert_eq!(profiles.len(), 1);
    assert!(state.store.get(&first.pid.to_string()).await.is_ok());

    // and the original credentials are untouched
    assert!(state.accounts.login("a@x.com", "p").await.is_ok());
}

#[tokio::test]
async fn test_failed_account_insert_removes_profile() {
    let store = FlakyStore::failing_inserts_for("@");
    let state = AppState::new(store, test_settings()).unwrap();

    let err = state.accounts.create_account("a@x.com", "p").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
    assert!(profiles_for(&*state.store, "a@x.com").await.is_empty());
}

#[tokio::test]
async fn test_failed_rollback_reports_orphan() {
    let store = FlakyStore::failing_inserts_for("@");
    store.fail_remove.store(true, Ordering::SeqCst);
    let state = AppState::new(store, test_settings()).unwrap();

    let err = state.accounts.create_account("a@x.com", "p").await.unwrap_err();
    let AppError::CompensationFailure { pid, .. } = &err else {
        panic!("expected compensation failure, got {err:?}");
    };

    // the orphan is the profile that could not be removed
    let orphan = state.store.get(&pid.to_string()).await.unwrap().value;
    assert_eq!(orphan["email"], "a@x.com");
}

#[tokio::test]
async fn test_get_account_and_profile_record() {
    let state = memory_state();
    let created = state.accounts.create_account("a@x.com", "p").await.unwrap();

    let profile = state.accounts.get_account(created.pid).await.unwrap();
    assert_eq!(profile.email, "a@x.com");

    let record = state
        .accounts
        .get_profile_record(&created.pid.to_string())
        .await
        .unwrap();
    assert_eq!(record.value["type"], "profile");

    assert!(matches!(
        state.accounts.get_account(Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
    // an account key is not readable through the profile path
    assert!(matches!(
        state.accounts.get_profile_record("a@x.com").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_storage_outage_on_login_is_not_masked() {
    let store = FlakyStore::default();
    let state = AppState::new(store, test_settings()).unwrap();
    state.accounts.create_account("a@x.com", "p").await.unwrap();

    state.store.fail_get.store(true, Ordering::SeqCst);
    let err = state.accounts.login("a@x.com", "p").await.unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));
}
