use crate::constants::{ANY_METHODS, MAX_HANDLERS};
use crate::context::Context;
use crate::Error;
use http::Method;
use std::sync::Arc;

pub use self::group::RouterGroup;

mod group;

/// A type-erased request handler.
pub type HandlerFunc = Arc<dyn Fn(&mut Context) + Send + Sync + 'static>;

/// The ordered handlers that process one route: middleware first.
pub type HandlerChain = Arc<[HandlerFunc]>;

/// Anything that can process a request.
///
/// Implemented for every `Fn(&mut Context) + Send + Sync + 'static`, so
/// plain functions and closures both work. Annotate closure arguments
/// (`|ctx: &mut Context|`) so the compiler picks the right signature.
pub trait Handler: Fn(&mut Context) + Send + Sync + 'static {}

impl<F> Handler for F where F: Fn(&mut Context) + Send + Sync + 'static {}

/// Boxes `handler` into a [`HandlerFunc`].
pub fn handler_fn<H: Handler>(handler: H) -> HandlerFunc {
    Arc::new(handler)
}

/// Route registration, shared by [`Engine`](crate::Engine) and
/// [`RouterGroup`].
///
/// Every method returns an error instead of registering a route the tree
/// can't represent; startup code is expected to bail out with `?`.
///
/// # Examples
///
/// ```
/// use gon::{Context, Engine, Routes};
/// use http::StatusCode;
///
/// fn show(ctx: &mut Context) {
///     let id = ctx.param("id").unwrap_or_default().to_owned();
///     ctx.string(StatusCode::OK, id);
/// }
///
/// # fn main() -> gon::Result<()> {
/// let mut engine = Engine::new();
/// engine
///     .get("/users/:id", show)?
///     .post("/users", |ctx: &mut Context| ctx.status(StatusCode::CREATED))?;
/// # Ok(())
/// # }
/// ```
pub trait Routes {
    /// Registers `handlers` for each of `methods` and `path`, after the
    /// middleware of the receiver.
    ///
    /// Either every method is registered or, on error, none is.
    fn handle_methods(&mut self, methods: &[&str], path: &str, handlers: Vec<HandlerFunc>) -> crate::Result<&mut Self>;

    /// Appends a middleware to the receiver. It only applies to routes
    /// registered afterwards.
    fn use_middleware<H: Handler>(&mut self, middleware: H) -> &mut Self;

    /// Registers `handlers` for `method` and `path`, after the middleware
    /// of the receiver.
    fn handle(&mut self, method: &str, path: &str, handlers: Vec<HandlerFunc>) -> crate::Result<&mut Self> {
        self.handle_methods(&[method], path, handlers)
    }

    fn get<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::GET.as_str(), path, vec![handler_fn(handler)])
    }

    fn post<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::POST.as_str(), path, vec![handler_fn(handler)])
    }

    fn put<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::PUT.as_str(), path, vec![handler_fn(handler)])
    }

    fn delete<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::DELETE.as_str(), path, vec![handler_fn(handler)])
    }

    fn head<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::HEAD.as_str(), path, vec![handler_fn(handler)])
    }

    fn patch<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::PATCH.as_str(), path, vec![handler_fn(handler)])
    }

    fn options<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle(Method::OPTIONS.as_str(), path, vec![handler_fn(handler)])
    }

    /// Registers `handler` for GET, POST, PUT, DELETE, HEAD, PATCH,
    /// OPTIONS, TRACE and CONNECT.
    fn any<H: Handler>(&mut self, path: &str, handler: H) -> crate::Result<&mut Self> {
        let methods: Vec<&str> = ANY_METHODS.iter().map(Method::as_str).collect();
        self.handle_methods(&methods, path, vec![handler_fn(handler)])
    }

    /// Registers `handler` for each of `methods`.
    fn match_methods<H: Handler>(&mut self, methods: &[&str], path: &str, handler: H) -> crate::Result<&mut Self> {
        self.handle_methods(methods, path, vec![handler_fn(handler)])
    }
}

/// Prefixes `handlers` with the middleware in `base`.
pub(crate) fn combine_handlers(
    base: &[HandlerFunc],
    handlers: Vec<HandlerFunc>,
    path: &str,
) -> crate::Result<Vec<HandlerFunc>> {
    let count = base.len() + handlers.len();
    if count > MAX_HANDLERS {
        return Err(Error::TooManyHandlers {
            path: path.to_owned(),
            count,
            max: MAX_HANDLERS,
        });
    }

    let mut merged = Vec::with_capacity(count);
    merged.extend_from_slice(base);
    merged.extend(handlers);
    Ok(merged)
}
