//! Request logging middleware.
//!
//! [`Trace`] observes every request passing through the chain without
//! altering its outcome. Per request it emits:
//!
//! ```text
//! INFO  Received GET request to /users/42
//! INFO  Completed GET /users/42 with status 200 in 5 ms
//! ```
//!
//! and, when the downstream chain fails instead of responding:
//!
//! ```text
//! ERROR Request processing failed
//! ```
//!
//! with the error's detail attached. The error itself is re-propagated
//! unchanged — `Trace` never recovers, swallows, or rewraps a failure; the
//! server still owes the client its `500`.
//!
//! Around the whole dispatch, `Trace` installs a fresh
//! [correlation context](crate::context) holding the request's
//! `method-and-path`, and wraps downstream work in a `tracing` span carrying
//! the same value, so every log record emitted while the request is in
//! flight can be tied back to it. The context is torn down on every exit
//! path — normal return, error, or cancellation — before control leaves the
//! middleware, so nothing bleeds into the next request on the same worker.
//!
//! Register it outermost, so the timing covers the rest of the stack:
//!
//! ```rust,no_run
//! use ruta::{Router, Trace, health};
//!
//! let app = Router::new()
//!     .layer(Trace::new())
//!     .get("/healthz", health::liveness);
//! ```

use tokio::time::Instant;
use tracing::{Instrument, error, info, info_span};

use crate::context;
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Request logging middleware. See the [module docs](self).
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

impl Trace {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for Trace {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
        let method = req.method().clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            let method_path = format!("{method} {path}");
            let span = info_span!("request", method_path = %method_path);

            context::scope(async move {
                context::set(context::METHOD_AND_PATH, method_path);

                info!("Received {method} request to {path}");
                let start = Instant::now();

                match next.run(req).await {
                    Ok(response) => {
                        let elapsed = start.elapsed().as_millis();
                        info!(
                            "Completed {method} {path} with status {} in {elapsed} ms",
                            response.status_code().as_u16()
                        );
                        Ok(response)
                    }
                    Err(error) => {
                        error!(%error, "Request processing failed");
                        Err(error)
                    }
                }
            })
            .instrument(span)
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Endpoint;

    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use http::{HeaderMap, Method, StatusCode};
    use tracing_test::traced_test;

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, path.to_owned(), HeaderMap::new(), Bytes::new())
    }

    fn traced(endpoint: Endpoint) -> Next {
        let chain: Arc<[Arc<dyn Middleware>]> =
            Arc::from(vec![Arc::new(Trace::new()) as Arc<dyn Middleware>]);
        Next::new(chain, endpoint)
    }

    #[traced_test]
    #[tokio::test(start_paused = true)]
    async fn logs_received_then_completed_with_duration() {
        let endpoint: Endpoint = Arc::new(|_req| {
            Box::pin(async {
                tokio::time::advance(Duration::from_millis(5)).await;
                Ok(Response::status(StatusCode::OK))
            })
        });

        let res = traced(endpoint).run(request(Method::GET, "/users/42")).await.unwrap();

        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(logs_contain("Received GET request to /users/42"));
        assert!(logs_contain("Completed GET /users/42 with status 200 in 5 ms"));
    }

    #[traced_test]
    #[tokio::test]
    async fn failure_is_logged_and_propagated_unchanged() {
        let endpoint: Endpoint =
            Arc::new(|_req| Box::pin(async { Err(Error::request("validation failed")) }));

        let err = traced(endpoint).run(request(Method::POST, "/orders")).await.unwrap_err();

        assert!(matches!(err, Error::Request(_)));
        assert_eq!(err.to_string(), "validation failed");
        assert!(logs_contain("Received POST request to /orders"));
        assert!(logs_contain("Request processing failed"));
        assert!(logs_contain("validation failed"));
        assert!(!logs_contain("Completed"));
    }

    #[traced_test]
    #[tokio::test]
    async fn context_is_live_downstream_and_cleared_after() {
        let endpoint: Endpoint = Arc::new(|_req| {
            Box::pin(async {
                assert_eq!(
                    context::get(context::METHOD_AND_PATH).as_deref(),
                    Some("GET /users/42"),
                );
                Ok(Response::status(StatusCode::OK))
            })
        });

        traced(endpoint).run(request(Method::GET, "/users/42")).await.unwrap();

        // Next simulated request on this execution unit sees no residue.
        assert_eq!(context::get(context::METHOD_AND_PATH), None);
    }

    #[tokio::test]
    async fn context_is_cleared_after_a_failure_too() {
        let endpoint: Endpoint =
            Arc::new(|_req| Box::pin(async { Err(Error::request("boom")) }));

        let _ = traced(endpoint).run(request(Method::GET, "/")).await;
        assert_eq!(context::get(context::METHOD_AND_PATH), None);
    }

    #[tokio::test]
    async fn concurrent_requests_keep_contexts_apart() {
        let observe: Endpoint = Arc::new(|req| {
            let expected = format!("{} {}", req.method(), req.path());
            Box::pin(async move {
                tokio::task::yield_now().await;
                assert_eq!(context::get(context::METHOD_AND_PATH).as_deref(), Some(&*expected));
                Ok(Response::status(StatusCode::OK))
            })
        });

        let a = traced(Arc::clone(&observe)).run(request(Method::GET, "/users/42"));
        let b = traced(observe).run(request(Method::POST, "/orders"));

        let (a, b) = tokio::join!(a, b);
        a.unwrap();
        b.unwrap();
    }

    #[traced_test]
    #[tokio::test]
    async fn observes_without_altering_the_response() {
        let endpoint: Endpoint = Arc::new(|_req| {
            Box::pin(async {
                Ok(Response::builder()
                    .status(StatusCode::CREATED)
                    .header("location", "/orders/7")
                    .json(br#"{"id":7}"#.to_vec()))
            })
        });

        let res = traced(endpoint).run(request(Method::POST, "/orders")).await.unwrap();

        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert!(logs_contain("Completed POST /orders with status 201"));
    }
}
