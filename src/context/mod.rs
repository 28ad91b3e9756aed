//! Per-request state and the handler chain walk.

use crate::constants::{ABORT_INDEX, MIME_PLAIN};
use crate::route::HandlerChain;
use crate::tree::SkippedNode;
use crate::types::Params;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{Extensions, HeaderName, HeaderValue, Method, Request, StatusCode, Uri};
use std::net::SocketAddr;

pub use self::pool::ContextPool;
pub use self::writer::ResponseWriter;

mod pool;
mod writer;

/// The state of one request while its handler chain runs.
///
/// Contexts are pooled by the [`Engine`](crate::Engine): once the chain
/// has finished the context is reset and handed to the next request, so a
/// handler must not hold on to anything borrowed from it. Use
/// [`snapshot`](Context::snapshot) to pass request data to another task.
pub struct Context {
    pub(crate) request: Request<Bytes>,
    writer: ResponseWriter,
    handlers: Option<HandlerChain>,
    index: i16,
    pub(crate) params: Params,
    full_path: String,
    keys: Extensions,
    pub(crate) skipped: Vec<SkippedNode>,
}

impl Context {
    pub(crate) fn with_capacity(max_params: usize, max_sections: usize) -> Context {
        Context {
            request: Request::default(),
            writer: ResponseWriter::default(),
            handlers: None,
            index: -1,
            params: Params::with_capacity(max_params),
            full_path: String::new(),
            keys: Extensions::new(),
            skipped: Vec::with_capacity(max_sections),
        }
    }

    /// Runs the remaining handlers of the chain.
    ///
    /// Call it from a middleware to run the handlers after it and then
    /// continue with code of its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use gon::{Context, Engine, Routes};
    ///
    /// let mut engine = Engine::new();
    /// engine.use_middleware(|ctx: &mut Context| {
    ///     ctx.set(String::from("before"));
    ///     ctx.next();
    ///     // Runs after every later handler has returned.
    /// });
    /// ```
    pub fn next(&mut self) {
        let Some(handlers) = self.handlers.clone() else {
            return;
        };

        self.index = self.index.saturating_add(1);
        while let Some(handler) = usize::try_from(self.index).ok().and_then(|i| handlers.get(i)) {
            handler(self);
            self.index = self.index.saturating_add(1);
        }
    }

    /// Stops the chain: no handler after the current one is started.
    ///
    /// Handlers already running, including the caller, return normally.
    pub fn abort(&mut self) {
        self.index = ABORT_INDEX;
    }

    pub fn is_aborted(&self) -> bool {
        self.index >= ABORT_INDEX
    }

    /// Writes the status line with an empty body and aborts the chain.
    pub fn abort_with_status(&mut self, status: StatusCode) {
        self.writer.set_status(status);
        self.writer.write_header_now();
        self.abort();
    }

    /// Number of handlers in the resolved chain.
    pub fn handler_count(&self) -> usize {
        self.handlers.as_ref().map_or(0, |handlers| handlers.len())
    }

    /// Value of the path parameter `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The registered route that matched, e.g. `/users/:id`. Empty when
    /// nothing matched.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn request(&self) -> &Request<Bytes> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<Bytes> {
        &mut self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// Address of the peer, when the request came in through
    /// [`RouterService`](crate::RouterService).
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.request.extensions().get::<SocketAddr>().copied()
    }

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut ResponseWriter {
        &mut self.writer
    }

    pub fn status(&mut self, status: StatusCode) {
        self.writer.set_status(status);
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) {
        self.writer.headers_mut().insert(name, value);
    }

    /// Writes a plain text response.
    pub fn string(&mut self, status: StatusCode, body: impl AsRef<str>) {
        self.writer.set_status(status);
        self.writer
            .headers_mut()
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(MIME_PLAIN));
        self.writer.write(body.as_ref().as_bytes());
    }

    /// Answers with a redirect to `location`.
    pub fn redirect(&mut self, status: StatusCode, location: &str) {
        match HeaderValue::try_from(location) {
            Ok(value) => {
                self.writer.headers_mut().insert(LOCATION, value);
                self.writer.set_status(status);
            }
            Err(err) => {
                tracing::error!("invalid redirect location {:?}: {}", location, err);
                self.writer.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
        self.writer.write_header_now();
    }

    /// Stores a value for the rest of this request, one per type.
    pub fn set<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.keys.insert(value);
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.keys.get::<T>()
    }

    /// An owned copy of the routing results that can outlive the context.
    ///
    /// ```
    /// use gon::{Context, Engine, Routes};
    ///
    /// let mut engine = Engine::new();
    /// engine
    ///     .get("/users/:id", |ctx: &mut Context| {
    ///         let snapshot = ctx.snapshot();
    ///         std::thread::spawn(move || {
    ///             assert_eq!(snapshot.param("id"), Some("7"));
    ///         })
    ///         .join()
    ///         .unwrap();
    ///     })
    ///     .unwrap();
    /// ```
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            method: self.request.method().clone(),
            uri: self.request.uri().clone(),
            full_path: self.full_path.clone(),
            params: self.params.clone(),
        }
    }

    pub(crate) fn install(&mut self, handlers: HandlerChain, full_path: &str) {
        self.handlers = Some(handlers);
        self.full_path.clear();
        self.full_path.push_str(full_path);
        self.index = -1;
    }

    pub(crate) fn reserve(&mut self, max_params: usize, max_sections: usize) {
        self.params.reserve_total(max_params);
        if self.skipped.capacity() < max_sections {
            self.skipped.reserve(max_sections - self.skipped.len());
        }
    }

    pub(crate) fn take_response(&mut self) -> http::Response<http_body_util::Full<Bytes>> {
        self.writer.take_response()
    }

    pub(crate) fn reset(&mut self) {
        self.request = Request::default();
        self.writer.reset();
        self.handlers = None;
        self.index = -1;
        self.params.clear();
        self.full_path.clear();
        self.keys.clear();
        self.skipped.clear();
    }
}

/// Routing results copied out of a [`Context`].
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub method: Method,
    pub uri: Uri,
    pub full_path: String,
    pub params: Params,
}

impl ContextSnapshot {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }
}
