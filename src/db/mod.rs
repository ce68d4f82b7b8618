//! # Database Module
//!
//! - `models`: Row types (Snippet, User)
//! - `snippets`: Queries over the snippets table
//! - `users`: Registration, credential checks and existence lookups

pub mod models;
pub mod snippets;
pub mod users;
