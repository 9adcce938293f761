// ================
// common/src/lib.rs
// ================
//! Common types shared between the blog backend and its clients.
//! This module defines the stored document shapes and the JSON bodies
//! exchanged over HTTP.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persistent identity handle, distinct from the email address.
pub type Pid = Uuid;

/// Opaque bearer credential mapping to a [`Pid`].
pub type SessionId = Uuid;

/// A document as held by the store, discriminated by its `type` field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Document {
    /// Login record, keyed by email
    Account(Account),
    /// Identity record, keyed by pid
    Profile(Profile),
    /// Bearer session, keyed by session id
    Session(Session),
    /// Blog post, keyed by a fresh id
    Blog(BlogPost),
}

/// Login record. The password field only ever holds a PHC hash string.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub pid: Pid,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Profile {
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub pid: Pid,
}

/// Blog post owned by `pid`
/// # Fields
/// * `timestamp` - creation time in milliseconds since the Unix epoch
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlogPost {
    pub pid: Pid,
    pub title: String,
    pub content: String,
    pub timestamp: i64,
}

impl From<BlogPost> for Document {
    fn from(post: BlogPost) -> Self {
        Document::Blog(post)
    }
}

impl From<Profile> for Document {
    fn from(profile: Profile) -> Self {
        Document::Profile(profile)
    }
}

/// Body of `POST /account` and `POST /login`.
///
/// Fields are optional so that absent values reach the handler and are
/// reported as missing rather than rejected by the JSON extractor.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /blog`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NewPost {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Reply to a successful signup. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AccountCreated {
    pub pid: Pid,
    pub email: String,
    /// Store revision of the inserted account document
    pub cas: u64,
}

/// Reply to a successful login.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub sid: SessionId,
}
