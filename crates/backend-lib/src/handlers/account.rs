// ============================
// crates/backend-lib/src/handlers/account.rs
// ============================
//! Account, login and profile handlers.
use crate::auth::AuthenticatedPid;
use crate::error::AppError;
use crate::handlers::JsonBody;
use crate::storage::{DocumentStore, StoredDocument};
use crate::validation::required;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use blog_common::{AccountCreated, Credentials, Document, LoginResponse};
use std::sync::Arc;

/// `POST /account`
pub async fn create_account<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<AccountCreated>, AppError> {
    let email = required(body.email.as_deref(), "email")?;
    let password = required(body.password.as_deref(), "password")?;

    let created = state.accounts.create_account(email, password).await?;
    Ok(Json(created))
}

/// `POST /login`
pub async fn login<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    JsonBody(body): JsonBody<Credentials>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = required(body.email.as_deref(), "email")?;
    let password = required(body.password.as_deref(), "password")?;

    let sid = state.accounts.login(email, password).await?;
    Ok(Json(LoginResponse { sid }))
}

/// `GET /account`: the caller's profile
pub async fn current_account<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPid(pid): AuthenticatedPid,
) -> Result<Json<Document>, AppError> {
    let profile = state.accounts.get_account(pid).await?;
    Ok(Json(Document::from(profile)))
}

/// `GET /profile/{pid}`: raw store record, no authentication
pub async fn profile_record<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(pid): Path<String>,
) -> Result<Json<StoredDocument>, AppError> {
    let record = state.accounts.get_profile_record(&pid).await?;
    Ok(Json(record))
}
