//! Ordered composition of router-wrapping middleware.
//!
//! `Router::layer` makes the most recently added layer the outermost one,
//! which reads backwards when a pipeline is listed top to bottom. [`Stack`]
//! takes wrappers in request order instead: the first wrapper added sees the
//! request first and the response last.

use axum::Router;

type Wrapper<S> = Box<dyn Fn(Router<S>) -> Router<S> + Send + Sync>;

/// An ordered list of middleware wrappers, outermost first.
///
/// Built once at startup; [`Stack::wrap`] can then be applied to any number
/// of routers.
pub struct Stack<S = ()> {
    wrappers: Vec<Wrapper<S>>,
}

impl<S> Stack<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            wrappers: Vec::new(),
        }
    }

    /// Append a wrapper. It runs inside every wrapper added before it.
    pub fn with<F>(mut self, wrapper: F) -> Self
    where
        F: Fn(Router<S>) -> Router<S> + Send + Sync + 'static,
    {
        self.wrappers.push(Box::new(wrapper));
        self
    }

    /// Wrap `router` so that requests pass through the wrappers in the order
    /// they were added before reaching it.
    pub fn wrap(&self, router: Router<S>) -> Router<S> {
        self.wrappers
            .iter()
            .rev()
            .fold(router, |router, wrapper| wrapper(router))
    }
}

impl<S> Default for Stack<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        extract::Request,
        http::StatusCode,
        middleware::{from_fn, Next},
        routing::get,
    };
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn traced(name: &'static str, trace: Trace) -> impl Fn(Router) -> Router + Send + Sync + 'static {
        move |router: Router| {
            let trace = trace.clone();
            router.layer(from_fn(move |request: Request, next: Next| {
                let trace = trace.clone();
                async move {
                    trace.lock().unwrap().push(format!("{name}:pre"));
                    let response = next.run(request).await;
                    trace.lock().unwrap().push(format!("{name}:post"));
                    response
                }
            }))
        }
    }

    fn handler_router(trace: Trace) -> Router {
        Router::new().route(
            "/",
            get(move || {
                let trace = trace.clone();
                async move {
                    trace.lock().unwrap().push("handler".to_string());
                    StatusCode::OK
                }
            }),
        )
    }

    async fn call(router: Router) -> StatusCode {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_wrappers_run_as_onion_in_given_order() {
        let trace = Trace::default();
        let stack = Stack::new()
            .with(traced("A", trace.clone()))
            .with(traced("B", trace.clone()))
            .with(traced("C", trace.clone()));

        let status = call(stack.wrap(handler_router(trace.clone()))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["A:pre", "B:pre", "C:pre", "handler", "C:post", "B:post", "A:post"]
        );
    }

    #[tokio::test]
    async fn test_reversed_order_is_respected() {
        let trace = Trace::default();
        let stack = Stack::new()
            .with(traced("C", trace.clone()))
            .with(traced("A", trace.clone()));

        call(stack.wrap(handler_router(trace.clone()))).await;

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["C:pre", "A:pre", "handler", "A:post", "C:post"]
        );
    }

    #[tokio::test]
    async fn test_empty_stack_is_identity() {
        let trace = Trace::default();
        let stack: Stack = Stack::default();

        let status = call(stack.wrap(handler_router(trace.clone()))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(*trace.lock().unwrap(), vec!["handler"]);
    }

    #[tokio::test]
    async fn test_stack_can_wrap_more_than_one_router() {
        let trace = Trace::default();
        let stack = Stack::new().with(traced("A", trace.clone()));

        call(stack.wrap(handler_router(trace.clone()))).await;
        call(stack.wrap(handler_router(trace.clone()))).await;

        assert_eq!(trace.lock().unwrap().len(), 6);
    }
}
