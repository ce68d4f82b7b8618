//! # Response Rendering
//!
//! Every page is rendered as the JSON document a template would receive:
//! the common fields (year, flash message, login state, CSRF token) plus the
//! page-specific data flattened alongside them.

use crate::error::{AppError, AppResult};
use crate::middleware::{AuthStatus, CsrfToken};
use axum::{extract::FromRequestParts, http::request::Parts, Json};
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::Value;
use tower_sessions::Session;

/// Session key for one-shot messages shown on the next rendered page
pub const FLASH: &str = "flash";

/// Fields every page receives
#[derive(Debug, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
    #[serde(flatten)]
    pub page: Value,
}

/// Extractor gathering the common template fields for a request
///
/// The session's flash message is only consumed by [`Page::render`], so a
/// handler that bails out with an error leaves it for the next page.
pub struct Page {
    session: Session,
    is_authenticated: bool,
    csrf_token: String,
}

impl Page {
    /// Render `page` (a JSON object) together with the common fields.
    pub async fn render(self, page: Value) -> AppResult<Json<TemplateData>> {
        Ok(Json(TemplateData {
            current_year: Utc::now().year(),
            flash: pop_flash(&self.session).await?,
            is_authenticated: self.is_authenticated,
            csrf_token: self.csrf_token,
            page,
        }))
    }
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthStatus(is_authenticated) = AuthStatus::from_request_parts(parts, state)
            .await
            .unwrap_or(AuthStatus(false));
        let csrf_token = CsrfToken::from_request_parts(parts, state).await?;
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| AppError::Internal(message.to_string()))?;

        Ok(Page {
            session,
            is_authenticated,
            csrf_token: csrf_token.as_str().to_owned(),
        })
    }
}

/// Queue a message for the next rendered page.
pub async fn put_flash(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH, message).await?;
    Ok(())
}

async fn pop_flash(session: &Session) -> AppResult<Option<String>> {
    Ok(session.remove::<String>(FLASH).await?)
}
