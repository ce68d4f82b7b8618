//! # HTTP Request Handlers
//!
//! - `health`: Liveness endpoint
//! - `snippets`: Home page, snippet view and creation
//! - `users`: Signup, login and logout
//!
//! Handlers stay thin: extract from the request, call the `db` layer, render
//! through `render::Page` or redirect. Errors bubble up as `AppError`.

pub mod health;
pub mod snippets;
pub mod users;
