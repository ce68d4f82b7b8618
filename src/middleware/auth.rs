use crate::db::users;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::convert::Infallible;
use tower_sessions::Session;

/// Session key holding the logged-in user's id
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";
/// Session key holding the path to return to after logging in
pub const REDIRECT_PATH_AFTER_LOGIN: &str = "redirectPathAfterLogin";
/// Where unauthenticated visitors of protected pages are sent
pub const LOGIN_PATH: &str = "/user/login";

/// Request extension marking the session's user as verified for this
/// request. Only this module can construct it.
#[derive(Clone, Copy, Debug)]
struct Authenticated;

/// Whether [`authenticate`] verified the session's user for this request.
pub fn is_authenticated<B>(request: &axum::http::Request<B>) -> bool {
    request.extensions().get::<Authenticated>().is_some()
}

/// Extractor exposing the result of [`authenticate`] to handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthStatus(pub bool);

impl<S> FromRequestParts<S> for AuthStatus
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthStatus(parts.extensions.get::<Authenticated>().is_some()))
    }
}

/// Look up the session's user once per request
///
/// A session without a user id (or with id 0) passes through untouched. When
/// the id belongs to a user that still exists the request is marked
/// authenticated; a stale id (deleted user) leaves it unmarked. Session or
/// database failures abort the chain with a 500.
pub async fn authenticate(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user_id = session
        .get::<i64>(AUTHENTICATED_USER_ID)
        .await?
        .unwrap_or(0);
    if user_id == 0 {
        return Ok(next.run(request).await);
    }

    if users::exists(&state.db, user_id).await? {
        request.extensions_mut().insert(Authenticated);
    } else {
        tracing::debug!(user_id, "session refers to a user that no longer exists");
    }

    Ok(next.run(request).await)
}

/// Gate a route behind [`authenticate`]
///
/// Unauthenticated requests are redirected (303) to the login page after
/// remembering the requested path in the session; the inner handler never
/// runs. Authenticated responses get `Cache-Control: no-store` so protected
/// pages don't linger in browser or proxy caches.
pub async fn require_authentication(
    session: Session,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if !is_authenticated(&request) {
        let path = request.uri().path().to_owned();
        session.insert(REDIRECT_PATH_AFTER_LOGIN, path).await?;
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    }

    let mut response = next.run(request).await;
    response
        .headers_mut()
        .append(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Record `user_id` as logged in, renewing the session id first to prevent
/// session fixation.
pub async fn log_in(session: &Session, user_id: i64) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(AUTHENTICATED_USER_ID, user_id).await?;
    Ok(())
}

/// Forget the logged-in user, renewing the session id.
pub async fn log_out(session: &Session) -> AppResult<()> {
    session.cycle_id().await?;
    session.remove::<i64>(AUTHENTICATED_USER_ID).await?;
    Ok(())
}

/// Pop the path stored by [`require_authentication`], if any.
pub async fn take_redirect_path(session: &Session) -> AppResult<Option<String>> {
    session
        .remove::<String>(REDIRECT_PATH_AFTER_LOGIN)
        .await
        .map_err(AppError::from)
}
