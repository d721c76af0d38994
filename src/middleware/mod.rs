//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: request logging, metrics, request-id injection,
//! and authentication-header inspection.
//!
//! A middleware wraps the rest of the chain: it may act before delegating,
//! inspect or replace the response after, short-circuit without delegating
//! at all, or fail the request by returning an error. Registration is
//! [`Router::layer`](crate::Router::layer); the registered stack runs in
//! order around **every** dispatch — matched routes and 404s alike — exactly
//! once per incoming request.
//!
//! Built-in middleware:
//! - [`trace::Trace`] — request logging with per-request correlation context
//!
//! # Writing middleware
//!
//! Any `async fn (Request, Next) -> Result<Response, Error>` is a middleware:
//!
//! ```rust,no_run
//! use ruta::{Error, Next, Request, Response, Router, StatusCode};
//!
//! async fn require_token(req: Request, next: Next) -> Result<Response, Error> {
//!     if req.header("authorization").is_none() {
//!         return Ok(Response::status(StatusCode::UNAUTHORIZED));
//!     }
//!     next.run(req).await
//! }
//!
//! let app = Router::new().layer(require_token);
//! ```
//!
//! Returning `Err` fails the request: middleware further up the stack see the
//! error on their `next.run` result, and the server answers `500` if nothing
//! recovers. Errors pass through [`trace::Trace`] logged but untouched.

pub mod trace;

use std::future::Future;
use std::sync::Arc;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// A node in the middleware chain.
///
/// Implemented automatically for `async fn (Request, Next) -> Result<Response,
/// Error>`; implement it by hand only when the middleware carries
/// configuration, like [`trace::Trace`].
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>>;
}

impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Error>> + Send + 'static,
{
    fn handle(&self, req: Request, next: Next) -> BoxFuture<Result<Response, Error>> {
        Box::pin((self)(req, next))
    }
}

/// The routing endpoint at the bottom of every chain: route lookup plus
/// handler call, supplied by the router at dispatch time.
pub(crate) type Endpoint =
    Arc<dyn Fn(Request) -> BoxFuture<Result<Response, Error>> + Send + Sync + 'static>;

/// The remainder of the chain, from the current middleware's point of view.
///
/// [`run`](Next::run) consumes `self`, so a middleware can delegate at most
/// once; dropping it without calling `run` short-circuits the chain.
pub struct Next {
    chain: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    endpoint: Endpoint,
}

impl Next {
    pub(crate) fn new(chain: Arc<[Arc<dyn Middleware>]>, endpoint: Endpoint) -> Self {
        Self { chain, index: 0, endpoint }
    }

    /// Delegates the request to the rest of the chain and, past the last
    /// middleware, to the routing endpoint.
    pub fn run(mut self, req: Request) -> BoxFuture<Result<Response, Error>> {
        match self.chain.get(self.index).map(Arc::clone) {
            Some(mw) => {
                self.index += 1;
                mw.handle(req, self)
            }
            None => (self.endpoint)(req),
        }
    }
}
