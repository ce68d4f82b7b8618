//! Access logging
//!
//! One `tracing` event per request, emitted after the inner chain has
//! produced its response. Placed outside panic recovery, a panicking handler
//! is logged with the 500 that recovery produced.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;

    // A handler that never sets a status answers 200, and so does the log.
    let elapsed = start.elapsed();
    tracing::info!(
        status = response.status().as_u16(),
        method = %method,
        uri = %uri,
        elapsed_ms = elapsed.as_millis() as u64,
        "{} {} {} {:?}",
        response.status().as_u16(),
        method,
        uri,
        elapsed,
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::recover::recover_panic;
    use axum::{body::Body, http::StatusCode, middleware::from_fn, routing::get, Router};
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tower::ServiceExt;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    type Events = Arc<Mutex<Vec<HashMap<String, String>>>>;

    /// Collects the fields of every event into a map of strings.
    struct Capture(Events);

    struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

    impl Visit for FieldVisitor<'_> {
        fn record_u64(&mut self, field: &Field, value: u64) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.0.lock().unwrap().push(fields);
        }
    }

    async fn serve_logged(app: Router, uri: &str) -> (StatusCode, HashMap<String, String>) {
        let events = Events::default();
        let subscriber = tracing_subscriber::registry().with(Capture(events.clone()));
        let _guard = tracing::subscriber::set_default(subscriber);

        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let status = app.layer(from_fn(log_request)).oneshot(request).await.unwrap().status();

        let access = events
            .lock()
            .unwrap()
            .iter()
            .find(|fields| fields.contains_key("elapsed_ms"))
            .cloned()
            .expect("no access log event");
        (status, access)
    }

    #[tokio::test]
    async fn test_logs_implicit_200() {
        let app = Router::new().route("/", get(|| async { "hello" }));

        let (status, access) = serve_logged(app, "/?page=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(access["status"], "200");
        assert_eq!(access["method"], "GET");
        assert_eq!(access["uri"], "/?page=2");
    }

    #[tokio::test]
    async fn test_logs_explicit_status() {
        let app = Router::new().route("/", get(|| async { StatusCode::IM_A_TEAPOT }));

        let (status, access) = serve_logged(app, "/").await;

        assert_eq!(status, StatusCode::IM_A_TEAPOT);
        assert_eq!(access["status"], "418");
    }

    #[tokio::test]
    async fn test_logs_elapsed_time() {
        let app = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(25)).await;
                "slow"
            }),
        );

        let (_, access) = serve_logged(app, "/").await;

        let elapsed: u64 = access["elapsed_ms"].parse().unwrap();
        assert!(elapsed >= 25, "elapsed {elapsed}ms shorter than handler sleep");
    }

    #[tokio::test]
    async fn test_logs_recovered_panic_as_500() {
        async fn explode() -> &'static str {
            panic!("boom")
        }
        let app = Router::new().route("/", get(explode)).layer(recover_panic());

        let (status, access) = serve_logged(app, "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(access["status"], "500");
    }
}
