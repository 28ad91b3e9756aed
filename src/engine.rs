use crate::constants::{DEFAULT_404_BODY, DEFAULT_405_BODY, MAX_HANDLERS, MIME_PLAIN};
use crate::context::{Context, ContextPool};
use crate::helpers::{self, clean_path, count_params, count_sections, join_paths, percent_decode_request_path};
use crate::middleware::{logger, recovery};
use crate::route::{combine_handlers, handler_fn, Handler, HandlerChain, HandlerFunc, RouterGroup, Routes};
use crate::tree::{MethodTrees, SkippedNode, Tree};
use crate::types::{Params, RouteInfo};
use crate::Error;
use bytes::Bytes;
use http::header::{ALLOW, CONTENT_TYPE};
use http::{HeaderValue, Method, Request, Response, StatusCode};
use http_body_util::Full;
use std::borrow::Cow;
use std::fmt::{self, Debug, Formatter};

/// Request handling options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Redirect to the path with the trailing slash added or removed when
    /// only that variant has a route. GET requests get a 301, other
    /// methods a 307.
    pub redirect_trailing_slash: bool,
    /// Redirect to the cleaned path (see [`clean_path`]) when the request
    /// path has superfluous elements like `..` or `//` and the cleaned path
    /// has a route.
    pub redirect_fixed_path: bool,
    /// Answer with 405 and an `Allow` header when the path has routes for
    /// other methods only. Otherwise such requests get a 404.
    pub handle_method_not_allowed: bool,
    /// Route on the path exactly as it was sent instead of its
    /// percent-decoded form.
    pub use_raw_path: bool,
    /// Percent-decode parameter values. Only applies with `use_raw_path`,
    /// since the decoded path yields decoded values already.
    pub unescape_path_values: bool,
    /// Collapse repeated slashes and resolve `.` and `..` before routing.
    pub remove_extra_slash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            redirect_trailing_slash: true,
            redirect_fixed_path: false,
            handle_method_not_allowed: false,
            use_raw_path: false,
            unescape_path_values: true,
            remove_extra_slash: false,
        }
    }
}

/// The outcome of [`Engine::resolve`].
#[derive(Clone, Default)]
pub struct Resolved {
    pub handlers: Option<HandlerChain>,
    pub params: Params,
    /// The path would match with a trailing slash added or removed.
    pub tsr: bool,
    pub full_path: String,
}

impl Resolved {
    pub fn matched(&self) -> bool {
        self.handlers.is_some()
    }
}

impl Debug for Resolved {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("handlers", &self.handlers.as_ref().map(|chain| chain.len()))
            .field("params", &self.params)
            .field("tsr", &self.tsr)
            .field("full_path", &self.full_path)
            .finish()
    }
}

enum Outcome<'t> {
    Matched(&'t HandlerChain, &'t str),
    Redirect(String),
    MethodNotAllowed(String),
    NotFound,
}

/// The router: owns the route trees, the root middleware and the context
/// pool, and turns requests into responses.
///
/// Routes are registered through `&mut Engine` before serving starts; after
/// that the engine is shared (usually as `Arc<Engine>`) and only read.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use gon::{Context, Engine, Routes};
/// use http::{Request, StatusCode};
///
/// # fn main() -> gon::Result<()> {
/// let mut engine = Engine::new();
/// engine.get("/hello/:name", |ctx: &mut Context| {
///     let body = format!("Hello, {}!", ctx.param("name").unwrap_or("stranger"));
///     ctx.string(StatusCode::OK, body);
/// })?;
///
/// let req = Request::get("/hello/gon").body(Bytes::new()).unwrap();
/// let resp = engine.serve(req);
/// assert_eq!(resp.status(), StatusCode::OK);
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    handlers: Vec<HandlerFunc>,
    trees: MethodTrees<HandlerChain>,
    pool: ContextPool,
    max_params: u16,
    max_sections: u16,
    no_route: Vec<HandlerFunc>,
    no_method: Vec<HandlerFunc>,
    all_no_route: HandlerChain,
    all_no_method: HandlerChain,
    config: Config,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine without any middleware.
    pub fn new() -> Engine {
        Engine::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Engine {
        Engine {
            handlers: Vec::new(),
            trees: MethodTrees::default(),
            pool: ContextPool::new(),
            max_params: 0,
            max_sections: 0,
            no_route: Vec::new(),
            no_method: Vec::new(),
            all_no_route: Vec::new().into(),
            all_no_method: Vec::new().into(),
            config,
        }
    }

    /// Creates an engine with the [`logger`] and [`recovery`] middleware
    /// installed.
    pub fn with_defaults() -> Engine {
        let mut engine = Engine::new();
        engine.use_middleware(logger()).use_middleware(recovery());
        engine
    }

    /// Applies `configure` to the engine and returns it.
    ///
    /// ```
    /// use gon::Engine;
    ///
    /// let engine = Engine::new().with(|e| e.config_mut().handle_method_not_allowed = true);
    /// assert!(engine.config().handle_method_not_allowed);
    /// ```
    pub fn with(mut self, configure: impl FnOnce(&mut Engine)) -> Engine {
        configure(&mut self);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Starts a group of routes under `relative_path`, with the engine's
    /// current middleware.
    pub fn group(&mut self, relative_path: &str) -> RouterGroup<'_> {
        let base_path = join_paths("/", relative_path);
        let handlers = self.handlers.clone();
        RouterGroup::new(self, base_path, handlers)
    }

    /// Sets the handler for requests no route matches. It runs after the
    /// root middleware, with the status already set to 404.
    pub fn no_route<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.no_route = vec![handler_fn(handler)];
        self.rebuild_404_handlers();
        self
    }

    /// Sets the handler for requests whose path only has routes for other
    /// methods. Needs [`Config::handle_method_not_allowed`].
    pub fn no_method<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.no_method = vec![handler_fn(handler)];
        self.rebuild_405_handlers();
        self
    }

    fn rebuild_404_handlers(&mut self) {
        self.all_no_route = self.combine_fallback(&self.no_route);
    }

    fn rebuild_405_handlers(&mut self) {
        self.all_no_method = self.combine_fallback(&self.no_method);
    }

    fn combine_fallback(&self, handlers: &[HandlerFunc]) -> HandlerChain {
        let mut chain = Vec::with_capacity(self.handlers.len() + handlers.len());
        chain.extend_from_slice(&self.handlers);
        chain.extend_from_slice(handlers);
        chain.truncate(MAX_HANDLERS);
        chain.into()
    }

    /// Registers a complete handler chain for `method` and `path`.
    ///
    /// Unlike [`Routes::handle`] the root middleware is not prepended.
    pub fn add_route(&mut self, method: &str, path: &str, handlers: Vec<HandlerFunc>) -> crate::Result<()> {
        self.add_routes(&[method], path, handlers)
    }

    /// Registers one handler chain for several methods. On error the route
    /// table is left as it was.
    pub(crate) fn add_routes(&mut self, methods: &[&str], path: &str, handlers: Vec<HandlerFunc>) -> crate::Result<()> {
        let tokens = methods
            .iter()
            .map(|method| parse_method(method))
            .collect::<crate::Result<Vec<Method>>>()?;
        if !path.starts_with('/') {
            return Err(Error::PathMustStartWithSlash { path: path.to_owned() });
        }
        if handlers.is_empty() {
            return Err(Error::EmptyHandlers { path: path.to_owned() });
        }
        if handlers.len() > MAX_HANDLERS {
            return Err(Error::TooManyHandlers {
                path: path.to_owned(),
                count: handlers.len(),
                max: MAX_HANDLERS,
            });
        }

        let count = handlers.len();
        let chain = HandlerChain::from(handlers);
        // A single insert undoes itself on failure.
        let checkpoint = (tokens.len() > 1).then(|| self.trees.clone());
        for method in &tokens {
            if let Err(err) = self.trees.get_or_insert(method).add_route(path, chain.clone()) {
                if let Some(trees) = checkpoint {
                    self.trees = trees;
                }
                return Err(err);
            }
            tracing::debug!("{:<7} {:<25} --> {} handlers", method.as_str(), path, count);
        }

        self.max_params = self.max_params.max(count_params(path));
        self.max_sections = self.max_sections.max(count_sections(path));
        Ok(())
    }

    /// Every registered route.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.trees
            .iter()
            .flat_map(|(method, tree)| {
                tree.routes().map(move |(path, chain)| RouteInfo {
                    method: method.to_string(),
                    path: path.to_owned(),
                    handlers: chain.len(),
                })
            })
            .collect()
    }

    /// Looks up `path` in the tree for `method`. The path is matched as
    /// given, without decoding or cleaning.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolved {
        let mut resolved = Resolved::default();
        let Some(tree) = self.trees.get(method) else {
            return resolved;
        };

        let mut skipped = Vec::with_capacity(usize::from(self.max_sections));
        let value = tree.get_value(path, Some(&mut resolved.params), &mut skipped, false);
        resolved.tsr = value.tsr;
        if let Some(chain) = value.value {
            resolved.handlers = Some(chain.clone());
            resolved.full_path = value.full_path.to_owned();
        } else {
            resolved.params.clear();
        }
        resolved
    }

    /// Routes `req` and runs the matching handler chain.
    pub fn serve(&self, req: Request<Bytes>) -> Response<Full<Bytes>> {
        let mut ctx = self
            .pool
            .acquire(usize::from(self.max_params), usize::from(self.max_sections));
        ctx.request = req;

        self.handle_http_request(&mut ctx);

        let resp = ctx.take_response();
        self.pool.release(ctx);
        resp
    }

    fn handle_http_request(&self, ctx: &mut Context) {
        let method = ctx.request.method().clone();

        let outcome = {
            let raw_path = ctx.request.uri().path();
            let (mut path, unescape) = if self.config.use_raw_path {
                (Cow::Borrowed(raw_path), self.config.unescape_path_values)
            } else {
                (percent_decode_request_path(raw_path), false)
            };
            if self.config.remove_extra_slash {
                path = Cow::Owned(clean_path(&path));
            }

            self.route(
                &method,
                &path,
                raw_path,
                ctx.request.uri().query(),
                &mut ctx.params,
                &mut ctx.skipped,
                unescape,
            )
        };

        match outcome {
            Outcome::Matched(chain, full_path) => {
                ctx.install(chain.clone(), full_path);
                ctx.next();
            }
            Outcome::Redirect(location) => {
                ctx.params.clear();
                let status = if method == Method::GET {
                    StatusCode::MOVED_PERMANENTLY
                } else {
                    StatusCode::TEMPORARY_REDIRECT
                };
                tracing::debug!("redirecting request {}: {} --> {}", status.as_u16(), ctx.path(), location);
                ctx.redirect(status, &location);
            }
            Outcome::MethodNotAllowed(allow) => {
                ctx.params.clear();
                match HeaderValue::try_from(allow) {
                    Ok(allow) => ctx.header(ALLOW, allow),
                    Err(err) => tracing::error!("invalid Allow header: {}", err),
                }
                ctx.install(self.all_no_method.clone(), "");
                serve_error(ctx, StatusCode::METHOD_NOT_ALLOWED, DEFAULT_405_BODY);
            }
            Outcome::NotFound => {
                ctx.params.clear();
                tracing::trace!("no route for {} {}", method, ctx.path());
                ctx.install(self.all_no_route.clone(), "");
                serve_error(ctx, StatusCode::NOT_FOUND, DEFAULT_404_BODY);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn route<'t>(
        &'t self,
        method: &Method,
        path: &str,
        raw_path: &str,
        query: Option<&str>,
        params: &mut Params,
        skipped: &mut Vec<SkippedNode>,
        unescape: bool,
    ) -> Outcome<'t> {
        if let Some(tree) = self.trees.get(method) {
            let value = tree.get_value(path, Some(params), skipped, unescape);
            if let Some(chain) = value.value {
                return Outcome::Matched(chain, value.full_path);
            }

            if *method != Method::CONNECT && path != "/" {
                if value.tsr && self.config.redirect_trailing_slash {
                    return Outcome::Redirect(with_query(toggle_trailing_slash(raw_path), query));
                }
                if self.config.redirect_fixed_path && has_fixed_path(tree, path, skipped) {
                    return Outcome::Redirect(with_query(clean_path(raw_path), query));
                }
            }
        }

        if self.config.handle_method_not_allowed {
            let allowed: Vec<&str> = self
                .trees
                .iter()
                .filter(|(other, _)| *other != method)
                .filter(|(_, tree)| tree.get_value(path, None, skipped, unescape).value.is_some())
                .map(|(other, _)| other.as_str())
                .collect();
            if !allowed.is_empty() {
                return Outcome::MethodNotAllowed(allowed.join(", "));
            }
        }

        Outcome::NotFound
    }
}

impl Routes for Engine {
    fn handle_methods(&mut self, methods: &[&str], path: &str, handlers: Vec<HandlerFunc>) -> crate::Result<&mut Self> {
        if !path.starts_with('/') {
            return Err(Error::PathMustStartWithSlash { path: path.to_owned() });
        }
        let absolute_path = join_paths("/", path);
        let chain = combine_handlers(&self.handlers, handlers, &absolute_path)?;
        self.add_routes(methods, &absolute_path, chain)?;
        Ok(self)
    }

    fn use_middleware<H: Handler>(&mut self, middleware: H) -> &mut Self {
        self.handlers.push(handler_fn(middleware));
        self.rebuild_404_handlers();
        self.rebuild_405_handlers();
        self
    }
}

impl Debug for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("middleware", &self.handlers.len())
            .field("routes", &self.routes())
            .field("max_params", &self.max_params)
            .field("config", &self.config)
            .finish()
    }
}

fn parse_method(method: &str) -> crate::Result<Method> {
    if method.is_empty() {
        return Err(Error::EmptyMethod);
    }
    if !helpers::is_valid_method(method) {
        return Err(Error::InvalidMethod {
            method: method.to_owned(),
        });
    }
    Method::from_bytes(method.as_bytes()).map_err(|_| Error::InvalidMethod {
        method: method.to_owned(),
    })
}

/// Sets the status, runs the fallback chain and writes the default body
/// unless a handler answered already.
fn serve_error(ctx: &mut Context, status: StatusCode, default_body: &[u8]) {
    ctx.status(status);
    ctx.next();

    if ctx.writer().written() {
        return;
    }
    if ctx.writer().status() == status {
        ctx.header(CONTENT_TYPE, HeaderValue::from_static(MIME_PLAIN));
        ctx.writer_mut().write(default_body);
        return;
    }
    ctx.writer_mut().write_header_now();
}

fn has_fixed_path(tree: &Tree<HandlerChain>, path: &str, skipped: &mut Vec<SkippedNode>) -> bool {
    let cleaned = clean_path(path);
    cleaned != path && tree.get_value(&cleaned, None, skipped, false).value.is_some()
}

fn toggle_trailing_slash(path: &str) -> String {
    // A location starting with "//" is protocol relative.
    let path = format!("/{}", path.trim_start_matches('/'));
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
        _ => format!("{}/", path),
    }
}

fn with_query(mut location: String, query: Option<&str>) -> String {
    if let Some(query) = query {
        location.push('?');
        location.push_str(query);
    }
    location
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn engine_is_shareable() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn toggles_trailing_slash() {
        assert_eq!(toggle_trailing_slash("/users/"), "/users");
        assert_eq!(toggle_trailing_slash("/users"), "/users/");
        assert_eq!(toggle_trailing_slash("//evil.com/"), "/evil.com");
        assert_eq!(with_query("/a".to_owned(), Some("x=1")), "/a?x=1");
        assert_eq!(with_query("/a".to_owned(), None), "/a");
    }

    #[test]
    fn validates_registrations() {
        let noop = || vec![handler_fn(|_: &mut Context| {})];
        let mut engine = Engine::new();

        assert_eq!(engine.add_route("", "/", noop()), Err(Error::EmptyMethod));
        assert!(matches!(
            engine.add_route("get", "/", noop()),
            Err(Error::InvalidMethod { .. })
        ));
        assert!(matches!(
            engine.add_route("GET", "users", noop()),
            Err(Error::PathMustStartWithSlash { .. })
        ));
        assert!(matches!(
            engine.add_route("GET", "/", Vec::new()),
            Err(Error::EmptyHandlers { .. })
        ));
        assert!(engine.routes().is_empty());
    }

    #[test]
    fn tracks_param_and_section_maxima() {
        let mut engine = Engine::new();
        engine.get("/a/:b/:c", |_: &mut Context| {}).unwrap();
        engine.get("/x/*rest", |_: &mut Context| {}).unwrap();

        assert_eq!(engine.max_params, 2);
        assert_eq!(engine.max_sections, 3);
    }

    #[test]
    fn resolve_reports_matches_and_redirects() {
        let mut engine = Engine::new();
        engine.get("/users/:id", |_: &mut Context| {}).unwrap();

        let resolved = engine.resolve(&Method::GET, "/users/42");
        assert!(resolved.matched());
        assert_eq!(resolved.params.get("id"), Some("42"));
        assert_eq!(resolved.full_path, "/users/:id");

        let resolved = engine.resolve(&Method::GET, "/users/42/");
        assert!(!resolved.matched());
        assert!(resolved.tsr);
        assert!(resolved.params.is_empty());

        assert!(!engine.resolve(&Method::POST, "/users/42").matched());
    }
}
