// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const ACCOUNT_CREATED: &str = "account.created";
pub const ACCOUNT_ROLLED_BACK: &str = "account.rolled_back";
pub const LOGIN_SUCCEEDED: &str = "login.succeeded";
pub const LOGIN_FAILED: &str = "login.failed";
pub const SESSION_ISSUED: &str = "session.issued";
pub const SESSION_REFRESH_FAILED: &str = "session.refresh_failed";
pub const POST_CREATED: &str = "blog.post_created";
