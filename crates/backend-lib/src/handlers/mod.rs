//! HTTP handlers.
//!
//! Handlers translate request bodies into service calls; all failures are
//! returned as [`AppError`](crate::error::AppError) and rendered by its
//! `IntoResponse` impl.

pub mod account;
pub mod blog;
mod body;

pub use body::JsonBody;
