//! # Routing
//!
//! Two middleware stacks surround the routes:
//!
//! - the **standard** stack wraps everything, static files included:
//!   access log → security headers → panic recovery → timeout → session
//! - the **dynamic** stack wraps the application pages only:
//!   CSRF verification → authenticate
//!
//! Protected routes additionally sit behind `require_authentication`, applied
//! per method so that a wrong method still gets its 405.

use crate::error::AppError;
use crate::handlers::health::health_check;
use crate::handlers::snippets::{home, snippet_create, snippet_view};
use crate::handlers::users::{login, login_form, logout, signup, signup_form};
use crate::middleware::{
    authenticate, log_request, recover_panic, require_authentication, secure_headers,
    verify_csrf, Stack,
};
use crate::state::AppState;
use axum::{
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{services::ServeDir, timeout::TimeoutLayer};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    let dynamic = dynamic_stack(&state);
    let standard = standard_stack(&state);

    let pages = Router::new()
        .route("/", get(home))
        .route("/snippet/view", get(snippet_view))
        .route(
            "/snippet/create",
            post(snippet_create).route_layer(from_fn(require_authentication)),
        )
        .route("/user/signup", get(signup_form).post(signup))
        .route("/user/login", get(login_form).post(login))
        .route(
            "/user/logout",
            post(logout).route_layer(from_fn(require_authentication)),
        );

    let router = Router::new()
        .route("/health", get(health_check))
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .merge(dynamic.wrap(pages))
        .fallback(not_found)
        .with_state(state);

    standard.wrap(router)
}

fn dynamic_stack(state: &AppState) -> Stack<AppState> {
    let csrf_state = state.clone();
    let auth_state = state.clone();

    Stack::<AppState>::new()
        .with(move |router| router.layer(from_fn_with_state(csrf_state.clone(), verify_csrf)))
        .with(move |router| router.layer(from_fn_with_state(auth_state.clone(), authenticate)))
}

fn standard_stack(state: &AppState) -> Stack {
    let config = &state.config;
    let sessions = SessionManagerLayer::new(state.session_store())
        .with_secure(config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(
            config.session_lifetime_hours,
        )));
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Stack::<()>::new()
        .with(|router| router.layer(from_fn(log_request)))
        .with(|router| router.layer(from_fn(secure_headers)))
        .with(|router| router.layer(recover_panic()))
        .with(move |router| {
            router.layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                timeout,
            ))
        })
        .with(move |router| router.layer(sessions.clone()))
}

async fn not_found() -> AppError {
    AppError::NotFound
}
