//! CSRF protection (double-submit cookie)
//!
//! Every visitor gets a random token in the `csrf_token` cookie. Requests with
//! an unsafe method must echo that token back, either in the `X-CSRF-Token`
//! header or in the `csrf_token` field of a url-encoded form. A cross-site
//! attacker can make the browser send the cookie but cannot read it, so it
//! cannot produce the matching value.

use crate::error::{client_error, AppError, AppResult};
use crate::state::AppState;
use axum::{
    body::{self, Body},
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;

pub const CSRF_COOKIE: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_FIELD: &str = "csrf_token";

/// Form bodies are buffered to find the token; anything larger is refused.
const MAX_FORM_BYTES: usize = 64 * 1024;

/// The visitor's CSRF token, to be embedded in rendered forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// 32 random bytes, base64url encoded
    fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CsrfToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CsrfToken>()
            .cloned()
            .ok_or_else(|| AppError::Internal("CSRF middleware not installed".to_string()))
    }
}

/// Verify the submitted token on unsafe requests and issue the cookie when
/// the visitor has none yet.
///
/// Mismatches are answered with 400 Bad Request without reaching the inner
/// handler.
pub async fn verify_csrf(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    let existing = jar
        .get(CSRF_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty());
    let issued = existing.is_none();
    let token = existing
        .clone()
        .map(CsrfToken)
        .unwrap_or_else(CsrfToken::generate);

    let mut request = if is_safe(request.method()) {
        request
    } else {
        let (request, submitted) = submitted_token(request).await?;
        let verified = match (existing.as_deref(), submitted.as_deref()) {
            (Some(expected), Some(submitted)) => {
                constant_time_eq(expected.as_bytes(), submitted.as_bytes())
            }
            _ => false,
        };
        if !verified {
            tracing::warn!(
                method = %request.method(),
                uri = %request.uri(),
                "CSRF token missing or mismatched"
            );
            let mut response = client_error(StatusCode::BAD_REQUEST);
            if issued {
                set_cookie(&mut response, &token, state.config.secure_cookies)?;
            }
            return Ok(response);
        }
        request
    };

    request.extensions_mut().insert(token.clone());
    let mut response = next.run(request).await;
    if issued {
        set_cookie(&mut response, &token, state.config.secure_cookies)?;
    }
    Ok(response)
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Find the token the client submitted, buffering a form body if needed.
/// Returns the request rebuilt around the buffered body.
async fn submitted_token(request: Request) -> AppResult<(Request, Option<String>)> {
    if let Some(token) = header_token(request.headers()) {
        return Ok((request, Some(token)));
    }
    if !is_form(request.headers()) {
        return Ok((request, None));
    }

    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| AppError::ClientError(StatusCode::PAYLOAD_TOO_LARGE))?;
    let token = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FIELD)
        .map(|(_, value)| value.into_owned());

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

fn set_cookie(response: &mut Response, token: &CsrfToken, secure: bool) -> AppResult<()> {
    let cookie = Cookie::build((CSRF_COOKIE, token.as_str().to_owned()))
        .http_only(true)
        .secure(secure)
        .path("/")
        .same_site(SameSite::Lax)
        .build();
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|e| AppError::Internal(format!("invalid CSRF cookie: {e}")))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
