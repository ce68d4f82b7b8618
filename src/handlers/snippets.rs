//! # Snippet Handlers
//!
//! Listing, viewing and creating snippets.

use crate::db::snippets;
use crate::error::{AppError, AppResult};
use crate::render::{put_flash, Page, TemplateData};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tower_sessions::Session;
use validator::{Validate, ValidationError};

/// Home page: the latest live snippets
///
/// ## Route
/// GET /
pub async fn home(State(state): State<AppState>, page: Page) -> AppResult<Json<TemplateData>> {
    let snippets = snippets::latest(&state.db).await?;
    page.render(json!({ "snippets": snippets })).await
}

/// A single snippet
///
/// ## Route
/// GET /snippet/view?id=<int>
///
/// A missing, non-numeric or non-positive id is a 404, as is an unknown or
/// expired snippet. A pending flash message survives the 404.
pub async fn snippet_view(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    page: Page,
) -> AppResult<Json<TemplateData>> {
    let id = params
        .get("id")
        .and_then(|raw| raw.parse::<i64>().ok())
        .filter(|id| *id >= 1)
        .ok_or(AppError::NotFound)?;

    let snippet = snippets::get(&state.db, id).await?;
    page.render(json!({ "snippet": snippet })).await
}

#[derive(Debug, Deserialize, Validate)]
pub struct SnippetCreateForm {
    #[validate(custom(function = "check_title"))]
    pub title: String,
    #[validate(length(min = 1, message = "This field cannot be blank"))]
    pub content: String,
    #[validate(custom(function = "permitted_expiry"))]
    pub expires: i64,
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    if title.is_empty() {
        return Err(ValidationError::new("blank").with_message("This field cannot be blank".into()));
    }
    if title.chars().count() > 100 {
        return Err(ValidationError::new("too_long")
            .with_message("This field cannot be more than 100 characters long".into()));
    }
    Ok(())
}

fn permitted_expiry(days: i64) -> Result<(), ValidationError> {
    match days {
        1 | 7 | 365 => Ok(()),
        _ => Err(ValidationError::new("expires")
            .with_message("This field must equal 1, 7 or 365".into())),
    }
}

/// Create a snippet and redirect to it
///
/// ## Route
/// POST /snippet/create (authenticated, CSRF protected)
///
/// Other methods get 405 with `Allow: POST` from the method router.
pub async fn snippet_create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SnippetCreateForm>,
) -> AppResult<Redirect> {
    let form = SnippetCreateForm {
        title: form.title.trim().to_string(),
        content: form.content.trim().to_string(),
        expires: form.expires,
    };
    form.validate()?;

    let id = snippets::insert(&state.db, &form.title, &form.content, form.expires).await?;
    tracing::info!(snippet_id = id, "snippet created");

    put_flash(&session, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/view?id={id}")))
}
