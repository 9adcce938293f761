//! Blog handlers; both routes require a session.
use crate::auth::AuthenticatedPid;
use crate::error::AppError;
use crate::handlers::JsonBody;
use crate::storage::DocumentStore;
use crate::validation::required;
use crate::AppState;
use axum::{extract::State, Json};
use blog_common::{Document, NewPost};
use std::sync::Arc;

/// `POST /blog`
pub async fn create_post<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPid(pid): AuthenticatedPid,
    JsonBody(body): JsonBody<NewPost>,
) -> Result<Json<Document>, AppError> {
    let title = required(body.title.as_deref(), "title")?;
    let content = required(body.content.as_deref(), "content")?;

    let post = state.blogs.create_post(pid, title, content).await?;
    Ok(Json(Document::from(post)))
}

/// `GET /blogs`
pub async fn list_posts<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AuthenticatedPid(pid): AuthenticatedPid,
) -> Result<Json<Vec<Document>>, AppError> {
    let posts = state.blogs.list_posts(pid).await?;
    Ok(Json(posts.into_iter().map(Document::from).collect()))
}
