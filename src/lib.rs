//! # ruta
//!
//! A minimal HTTP framework for Rust services behind a reverse proxy, with
//! first-class request observability.
//!
//! ## The contract
//!
//! nginx handles TLS, rate limiting, slow clients, and body-size limits.
//! ruta does not — the proxy does proxy things, the framework does framework
//! things. Every feature ruta skips is one nginx already ships, tested at
//! scale, at no cost to you:
//!
//! - **Body-size limits** — `client_max_body_size` in nginx
//! - **Rate limiting** — `limit_req` / ingress-nginx annotations
//! - **Slow-client protection** — nginx timeout and buffer settings
//! - **TLS termination** — nginx SSL / k8s ingress
//!
//! What's left for ruta — the part that changes between applications:
//!
//! - Radix-tree routing — O(path-length) lookup via [`matchit`]
//! - Async I/O — tokio + hyper, HTTP/1.1 and HTTP/2
//! - A [`middleware`] chain that wraps every dispatch
//! - Built-in request logging ([`Trace`]) with a per-request
//!   [correlation context](context)
//! - Graceful shutdown — SIGTERM / Ctrl-C, drains in-flight requests
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ruta::{Request, Response, Router, Server, StatusCode, Trace};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .layer(Trace::new())
//!         .get("/users/{id}", get_user)
//!         .post("/users", create_user);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(br#"{"id":"99"}"#.to_vec())
//! }
//! ```
//!
//! With [`Trace`] registered, the log stream shows every request:
//!
//! ```text
//! INFO Received GET request to /users/42
//! INFO Completed GET /users/42 with status 200 in 5 ms
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod context;
pub mod health;
pub mod middleware;

#[doc(hidden)]
pub use handler::BoxFuture;

pub use error::Error;
pub use handler::Handler;
pub use http::{Method, StatusCode};
pub use middleware::trace::Trace;
pub use middleware::{Middleware, Next};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response};
pub use router::Router;
pub use server::Server;
