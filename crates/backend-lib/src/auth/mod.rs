// ============================
// backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod bearer;
pub mod password;
pub mod session;

pub use bearer::{bearer_token, AuthenticatedPid};
pub use password::CredentialHasher;
pub use session::{SessionManager, SESSION_TTL};
