//! Panic recovery
//!
//! A panic inside a handler unwinds into `CatchPanicLayer`, which turns it
//! into a single generic 500. The response carries `Connection: close` so the
//! client does not reuse a connection that just served a half-finished
//! request.

use crate::error::client_error;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;

/// Signature of the panic handler installed by [`recover_panic`].
pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer converting handler panics into a 500 response.
pub fn recover_panic() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(panic_response as PanicHandler)
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else {
        "non-string panic payload"
    };
    tracing::error!(panic = %detail, "recovered from panic in request handler");

    let mut response = client_error(StatusCode::INTERNAL_SERVER_ERROR);
    response
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("close"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::Request, routing::get, Router};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn explode() -> &'static str {
        panic!("database handle poisoned")
    }

    #[tokio::test]
    async fn test_panic_becomes_500_with_connection_close() {
        let app = Router::new()
            .route("/", get(explode))
            .layer(recover_panic());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get(header::CONNECTION).unwrap(), "close");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Internal Server Error"));
        assert!(!body.contains("poisoned"));
    }

    #[tokio::test]
    async fn test_non_panicking_handler_untouched() {
        let app = Router::new()
            .route("/", get(|| async { "fine" }))
            .layer(recover_panic());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::CONNECTION).is_none());
    }

    #[test]
    fn test_non_string_payload() {
        let response = panic_response(Box::new(42_u32));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
