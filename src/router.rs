//! Radix-tree request router and middleware registration.
//!
//! One tree per HTTP method, O(path-length) lookup. Middleware registered
//! with [`Router::layer`] wraps every dispatch — matched routes and 404s
//! alike — in registration order, exactly once per incoming request.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::{Endpoint, Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration method returns `self` so calls chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), middleware: Vec::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use ruta::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::GET,  "/users/{id}", get_user)
    ///     .on(Method::POST, "/users",      create_user);
    /// ```
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// `GET` shorthand for [`Router::on`].
    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    /// `POST` shorthand for [`Router::on`].
    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    /// `PUT` shorthand for [`Router::on`].
    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    /// `PATCH` shorthand for [`Router::on`].
    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    /// `DELETE` shorthand for [`Router::on`].
    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Appends `middleware` to the stack wrapping every dispatch.
    ///
    /// Layers run in registration order: the first registered is outermost.
    /// Register [`Trace`](crate::Trace) first so its timing covers the rest.
    pub fn layer(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Runs one request through the middleware chain and the routing endpoint.
    pub(crate) fn handle(self: &Arc<Self>, req: Request) -> BoxFuture<Result<Response, Error>> {
        let chain: Arc<[Arc<dyn Middleware>]> = Arc::from(self.middleware.clone());

        let router = Arc::clone(self);
        let endpoint: Endpoint = Arc::new(move |mut req: Request| {
            let router = Arc::clone(&router);
            Box::pin(async move {
                match router.lookup(req.method(), req.path()) {
                    Some((handler, params)) => {
                        req.set_params(params);
                        Ok(handler.call(req).await)
                    }
                    None => Ok(Response::status(StatusCode::NOT_FOUND)),
                }
            })
        });

        Next::new(chain, endpoint).run(req)
    }

    fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use bytes::Bytes;
    use http::HeaderMap;
    use tracing_test::traced_test;

    use crate::Trace;

    fn request(method: Method, path: &str) -> Request {
        Request::new(method, path.to_owned(), HeaderMap::new(), Bytes::new())
    }

    async fn echo_id(req: Request) -> Response {
        Response::text(req.param("id").unwrap_or("none").to_owned())
    }

    #[tokio::test]
    async fn routes_by_method_and_path() {
        let router = Arc::new(
            Router::new()
                .get("/users/{id}", echo_id)
                .post("/users", |_req: Request| async { Response::text("created") }),
        );

        let res = router.handle(request(Method::GET, "/users/42")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body, b"42");

        let res = router.handle(request(Method::POST, "/users")).await.unwrap();
        assert_eq!(res.body, b"created");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let router = Arc::new(Router::new().get("/users/{id}", echo_id));

        let res = router.handle(request(Method::GET, "/missing")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        // Registered path, wrong method.
        let res = router.handle(request(Method::DELETE, "/users/42")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[traced_test]
    #[tokio::test]
    async fn middleware_wraps_unrouted_requests_too() {
        let router = Arc::new(Router::new().layer(Trace::new()));

        let res = router.handle(request(Method::GET, "/missing")).await.unwrap();
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert!(logs_contain("Received GET request to /missing"));
        assert!(logs_contain("Completed GET /missing with status 404"));
    }
}
