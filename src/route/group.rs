use super::{combine_handlers, handler_fn, Handler, HandlerFunc, Routes};
use crate::helpers::join_paths;
use crate::Engine;

/// Routes sharing a path prefix and a list of middleware.
///
/// A group borrows the engine mutably, so it only lives for the duration of
/// route registration.
///
/// # Examples
///
/// ```
/// use gon::{Context, Engine, Routes};
///
/// # fn main() -> gon::Result<()> {
/// let mut engine = Engine::new();
/// let mut api = engine.group("/api");
/// api.use_middleware(|ctx: &mut Context| ctx.next());
/// api.get("/users", |_: &mut Context| {})?;
///
/// let mut v2 = api.group("v2");
/// assert_eq!(v2.base_path(), "/api/v2");
/// v2.get("/users", |_: &mut Context| {})?;
/// # Ok(())
/// # }
/// ```
pub struct RouterGroup<'e> {
    engine: &'e mut Engine,
    base_path: String,
    handlers: Vec<HandlerFunc>,
}

impl<'e> RouterGroup<'e> {
    pub(crate) fn new(engine: &'e mut Engine, base_path: String, handlers: Vec<HandlerFunc>) -> Self {
        RouterGroup {
            engine,
            base_path,
            handlers,
        }
    }

    /// Creates a nested group that inherits this group's prefix and
    /// middleware.
    pub fn group(&mut self, relative_path: &str) -> RouterGroup<'_> {
        RouterGroup {
            base_path: join_paths(&self.base_path, relative_path),
            handlers: self.handlers.clone(),
            engine: &mut *self.engine,
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Routes for RouterGroup<'_> {
    fn handle_methods(
        &mut self,
        methods: &[&str],
        relative_path: &str,
        handlers: Vec<HandlerFunc>,
    ) -> crate::Result<&mut Self> {
        let absolute_path = join_paths(&self.base_path, relative_path);
        let chain = combine_handlers(&self.handlers, handlers, &absolute_path)?;
        self.engine.add_routes(methods, &absolute_path, chain)?;
        Ok(self)
    }

    fn use_middleware<H: Handler>(&mut self, middleware: H) -> &mut Self {
        self.handlers.push(handler_fn(middleware));
        self
    }
}
