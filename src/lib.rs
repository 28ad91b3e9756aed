//! `gon` is a request router for the Rust HTTP library [hyper](https://hyper.rs/):
//! a radix tree per HTTP method for route matching, and Gin-style handler
//! chains for middleware.
//!
//! Core features:
//!
//! - Route paths with named parameters (`/users/:id`) and catch-alls (`/static/*filepath`)
//! - Pooled request contexts, so parameter storage is reused across requests
//! - Middleware that wraps the rest of the chain through [`Context::next`] and [`Context::abort`]
//! - Route groups sharing a path prefix and middleware
//! - Trailing slash and path cleaning redirects, 404 and 405 fallbacks
//!
//! ## Basic Example
//!
//! ```no_run
//! use gon::{Context, Engine, Routes, RouterService};
//! use http::StatusCode;
//! use hyper::server::conn::http1;
//! use hyper::service::Service;
//! use hyper_util::rt::TokioIo;
//! use std::net::SocketAddr;
//! use tokio::net::TcpListener;
//!
//! fn home(ctx: &mut Context) {
//!     ctx.string(StatusCode::OK, "Home page");
//! }
//!
//! fn user(ctx: &mut Context) {
//!     let id = ctx.param("id").unwrap_or_default().to_owned();
//!     ctx.string(StatusCode::OK, format!("Hello {}", id));
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // Logging and panic recovery come first.
//!     let mut engine = Engine::with_defaults();
//!     engine.get("/", home)?;
//!
//!     let mut api = engine.group("/api");
//!     api.get("/users/:id", user)?;
//!
//!     let router_service = RouterService::new(engine);
//!
//!     let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
//!     let listener = TcpListener::bind(addr).await?;
//!     println!("App is running on: {}", addr);
//!
//!     loop {
//!         let (stream, _) = listener.accept().await?;
//!         let request_service = router_service.call(&stream).await?;
//!
//!         tokio::spawn(async move {
//!             if let Err(err) = http1::Builder::new()
//!                 .serve_connection(TokioIo::new(stream), request_service)
//!                 .await
//!             {
//!                 eprintln!("Server error: {}", err);
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! ## Routing
//!
//! ### Route Paths
//!
//! A path segment starting with `:` captures one segment, one starting with
//! `*` captures the rest of the path, slashes included. A catch-all has to
//! be the last segment.
//!
//! ```
//! use gon::{Context, Engine, Routes};
//! use http::{Method, StatusCode};
//!
//! # fn main() -> gon::Result<()> {
//! let mut engine = Engine::new();
//! engine
//!     .get("/users/:id", |ctx: &mut Context| ctx.status(StatusCode::OK))?
//!     .get("/users/new", |ctx: &mut Context| ctx.status(StatusCode::OK))?
//!     .get("/static/*filepath", |ctx: &mut Context| ctx.status(StatusCode::OK))?;
//!
//! let resolved = engine.resolve(&Method::GET, "/static/css/site.css");
//! assert_eq!(resolved.params.get("filepath"), Some("/css/site.css"));
//!
//! // Static segments win over parameters.
//! let resolved = engine.resolve(&Method::GET, "/users/new");
//! assert_eq!(resolved.full_path, "/users/new");
//! # Ok(())
//! # }
//! ```
//!
//! Conflicting registrations fail instead of silently shadowing each
//! other:
//!
//! ```
//! use gon::{Context, Engine, Error, Routes};
//!
//! let mut engine = Engine::new();
//! engine.get("/files/*path", |_: &mut Context| {}).unwrap();
//!
//! let err = engine.get("/files/:name", |_: &mut Context| {}).unwrap_err();
//! assert!(matches!(err, Error::WildcardConflict { .. }));
//! ```
//!
//! ## Middleware
//!
//! Middleware are handlers that run before the route handler. Calling
//! [`Context::next`] runs the rest of the chain in place, so code after it
//! runs once the response is ready. [`Context::abort`] keeps the handlers
//! after the current one from running.
//!
//! ```
//! use bytes::Bytes;
//! use gon::{Context, Engine, Routes};
//! use http::{header, Request, StatusCode};
//!
//! fn auth(ctx: &mut Context) {
//!     if !ctx.request().headers().contains_key(header::AUTHORIZATION) {
//!         ctx.abort_with_status(StatusCode::UNAUTHORIZED);
//!     }
//! }
//!
//! # fn main() -> gon::Result<()> {
//! let mut engine = Engine::new();
//! let mut admin = engine.group("/admin");
//! admin.use_middleware(auth);
//! admin.get("/stats", |ctx: &mut Context| ctx.string(StatusCode::OK, "ok"))?;
//!
//! let req = Request::get("/admin/stats").body(Bytes::new()).unwrap();
//! assert_eq!(engine.serve(req).status(), StatusCode::UNAUTHORIZED);
//! # Ok(())
//! # }
//! ```

pub use self::context::{Context, ContextPool, ContextSnapshot, ResponseWriter};
pub use self::engine::{Config, Engine, Resolved};
pub use self::error::{Error, RouteError};
pub use self::helpers::clean_path;
pub use self::route::{handler_fn, Handler, HandlerChain, HandlerFunc, RouterGroup, Routes};
pub use self::service::{RequestService, RequestServiceBuilder, RouterService};
pub use self::types::{Param, Params, RouteInfo};
pub use constants::MAX_HANDLERS;

mod constants;
mod context;
mod engine;
mod error;
mod helpers;
pub mod middleware;
mod route;
mod service;
pub mod tree;
mod types;

/// A Result type returned by route registration.
pub type Result<T> = std::result::Result<T, Error>;
