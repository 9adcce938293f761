// ============================
// backend-lib/src/router.rs
// ============================
//! HTTP router.
use crate::handlers::{account, blog};
use crate::storage::DocumentStore;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router<S: DocumentStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route(
            "/account",
            post(account::create_account::<S>).get(account::current_account::<S>),
        )
        .route("/login", post(account::login::<S>))
        .route("/profile/{pid}", get(account::profile_record::<S>))
        .route("/blog", post(blog::create_post::<S>))
        .route("/blogs", get(blog::list_posts::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
