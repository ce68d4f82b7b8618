//! # Database Models
//!
//! Rows of the `snippets` and `users` tables. Timestamps are stored as
//! RFC 3339 text in UTC with whole seconds, which keeps them lexically
//! ordered so SQLite can compare them as plain strings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A shared text snippet
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// When the snippet was created (RFC 3339)
    pub created: String,
    /// After this moment the snippet is no longer listed or viewable
    pub expires: String,
}

/// A registered user account
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub created: String,
}

/// Format a timestamp the way it is stored in the database.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
