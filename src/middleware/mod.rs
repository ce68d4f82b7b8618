//! # Middleware Module
//!
//! The request pipeline, split into small `axum` middleware functions and
//! tower layers, composed in order by [`chain::Stack`]:
//!
//! - `logging`: one access-log event per request
//! - `headers`: browser hardening headers
//! - `recover`: panics into a 500 with `Connection: close`
//! - `csrf`: double-submit cookie verification
//! - `auth`: session-backed `authenticate` and the `require_authentication` gate

pub mod auth;
pub mod chain;
pub mod csrf;
pub mod headers;
pub mod logging;
pub mod recover;

pub use auth::{authenticate, is_authenticated, require_authentication, AuthStatus};
pub use chain::Stack;
pub use csrf::{verify_csrf, CsrfToken};
pub use headers::secure_headers;
pub use logging::log_request;
pub use recover::recover_panic;
