use http::Method;

/// Cursor value that marks a handler chain as aborted.
///
/// A route's accumulated chain (root middleware, group middleware and the
/// route handlers) must stay strictly below this length.
pub(crate) const ABORT_INDEX: i16 = 127;

/// Maximum number of handlers a single route may carry.
pub const MAX_HANDLERS: usize = ABORT_INDEX as usize - 1;

/// Methods registered by [`Routes::any`](crate::Routes::any), one tree each.
pub(crate) static ANY_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::HEAD,
    Method::PATCH,
    Method::OPTIONS,
    Method::TRACE,
    Method::CONNECT,
];

pub(crate) const DEFAULT_404_BODY: &[u8] = b"404 page not found";
pub(crate) const DEFAULT_405_BODY: &[u8] = b"405 method not allowed";

pub(crate) const MIME_PLAIN: &str = "text/plain; charset=utf-8";
