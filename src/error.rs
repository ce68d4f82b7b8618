//! # Error Handling
//!
//! Custom error type for the application and its conversion into HTTP
//! responses.
//!
//! Two families of errors exist:
//! - **Server errors** (database, session store, password hashing, internal):
//!   logged in full with `tracing::error!`, answered with a generic 500 so no
//!   internal detail leaks to the client.
//! - **Client errors** (not found, wrong method, invalid form input): answered
//!   with the matching 4xx status and its canonical reason.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name → human readable problem, as rendered back next to a form.
pub type FieldErrors = BTreeMap<String, String>;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors (SQLx library errors)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session store failures (load, save or (de)serialization of values)
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Hashing or parsing a stored password hash failed
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// The requested snippet doesn't exist or has expired
    #[error("Not found")]
    NotFound,

    /// Generic client error, rendered with the status' canonical reason
    #[error("Client error: {0}")]
    ClientError(StatusCode),

    /// Submitted form failed validation
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),

    /// Signup with an email address that is already registered
    #[error("Duplicate email")]
    DuplicateEmail,

    /// Login with an unknown email or a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Internal server errors (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    fn server_error(&self) -> Response {
        // Full detail stays in the server log
        tracing::error!(error = %self, "request failed");
        client_error(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Render a generic response for `status` with its canonical reason as body.
pub fn client_error(status: StatusCode) -> Response {
    let reason = status.canonical_reason().unwrap_or("Error");
    (status, Json(json!({ "error": reason }))).into_response()
}

fn unprocessable(errors: FieldErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": "Unprocessable Entity",
            "fields": errors,
        })),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Database(_)
            | AppError::Session(_)
            | AppError::PasswordHash(_)
            | AppError::Internal(_) => self.server_error(),
            AppError::NotFound => client_error(StatusCode::NOT_FOUND),
            AppError::ClientError(status) => client_error(status),
            AppError::Validation(errors) => unprocessable(errors),
            AppError::DuplicateEmail => unprocessable(FieldErrors::from([(
                "email".to_string(),
                "Email address is already in use".to_string(),
            )])),
            AppError::InvalidCredentials => unprocessable(FieldErrors::from([(
                "generic".to_string(),
                "Email or password is incorrect".to_string(),
            )])),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, problems)| {
                problems.first().map(|problem| {
                    let message = problem
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| problem.code.to_string());
                    (field.to_string(), message)
                })
            })
            .collect();
        AppError::Validation(fields)
    }
}

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let response = AppError::Internal("connection refused on 10.0.0.7".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_client_error_uses_canonical_reason() {
        let response = AppError::ClientError(StatusCode::METHOD_NOT_ALLOWED).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["error"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn test_not_found() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_field_error() {
        let response = AppError::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["fields"]["email"], "Email address is already in use");
    }
}
