//! # User Handlers
//!
//! Signup, login and logout. Login state lives in the session under
//! `authenticatedUserID`; see `middleware::auth`.

use crate::db::users;
use crate::error::AppResult;
use crate::middleware::auth::{log_in, log_out, take_redirect_path};
use crate::render::{put_flash, Page, TemplateData};
use crate::state::AppState;
use axum::{extract::State, response::Redirect, Form, Json};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use validator::Validate;

/// Where a login goes when no protected page was requested first
const DEFAULT_AFTER_LOGIN: &str = "/";

#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, message = "This field cannot be blank"))]
    pub name: String,
    #[validate(email(message = "This field must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "This field must be at least 8 characters long"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "This field must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "This field cannot be blank"))]
    pub password: String,
}

/// GET /user/signup
pub async fn signup_form(page: Page) -> AppResult<Json<TemplateData>> {
    page.render(json!({ "form": { "name": "", "email": "" } })).await
}

/// POST /user/signup
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> AppResult<Redirect> {
    form.validate()?;

    let id = users::insert(&state.db, form.name.trim(), &form.email, &form.password).await?;
    tracing::info!(user_id = id, "user signed up");

    put_flash(&session, "Your signup was successful. Please log in.").await?;
    Ok(Redirect::to("/user/login"))
}

/// GET /user/login
pub async fn login_form(page: Page) -> AppResult<Json<TemplateData>> {
    page.render(json!({ "form": { "email": "" } })).await
}

/// POST /user/login
///
/// On success the session id is renewed and the visitor is sent back to the
/// page that bounced them to the login form, if any.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<Redirect> {
    form.validate()?;

    let id = users::authenticate(&state.db, &form.email, &form.password).await?;
    log_in(&session, id).await?;
    tracing::info!(user_id = id, "user logged in");

    let target = take_redirect_path(&session)
        .await?
        .unwrap_or_else(|| DEFAULT_AFTER_LOGIN.to_string());
    Ok(Redirect::to(&target))
}

/// POST /user/logout (authenticated)
pub async fn logout(session: Session) -> AppResult<Redirect> {
    log_out(&session).await?;
    put_flash(&session, "You've been logged out successfully!").await?;
    Ok(Redirect::to("/"))
}
