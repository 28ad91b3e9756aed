use thiserror::Error;

/// The error type for every registration failure.
///
/// Registration is a startup concern: an `Error` means the route table the
/// program asked for is inconsistent, so the caller is expected to bail out
/// with `?` instead of serving traffic. The tree is left exactly as it was
/// before the failing call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("HTTP method can not be empty")]
    EmptyMethod,

    #[error("invalid HTTP method '{method}': only uppercase ASCII letters are allowed")]
    InvalidMethod { method: String },

    #[error("path must begin with '/' in path '{path}'")]
    PathMustStartWithSlash { path: String },

    #[error("there must be at least one handler for path '{path}'")]
    EmptyHandlers { path: String },

    #[error("too many handlers for path '{path}': {count} exceeds the limit of {max}")]
    TooManyHandlers { path: String, count: usize, max: usize },

    #[error("handlers are already registered for path '{path}'")]
    DuplicateRoute { path: String },

    #[error("'{segment}' in new path '{path}' conflicts with existing wildcard '{wildcard}' in existing prefix '{prefix}'")]
    WildcardConflict {
        segment: String,
        path: String,
        wildcard: String,
        prefix: String,
    },

    #[error("only one wildcard per path segment is allowed, has: '{wildcard}' in path '{path}'")]
    InvalidWildcard { wildcard: String, path: String },

    #[error("wildcards must be named with a non-empty name in path '{path}'")]
    EmptyWildcardName { path: String },

    #[error("catch-all routes are only allowed at the end of the path in path '{path}'")]
    CatchAllNotAtEnd { path: String },

    #[error("no / before catch-all in path '{path}'")]
    NoSlashBeforeCatchAll { path: String },

    #[error("catch-all wildcard '{wildcard}' in new path '{path}' conflicts with existing path segment '{segment}' in existing prefix '{prefix}'")]
    CatchAllConflict {
        wildcard: String,
        path: String,
        segment: String,
        prefix: String,
    },
}

/// Boxed error produced by the service adapters, e.g. when a request body
/// can not be collected.
pub type RouteError = Box<dyn std::error::Error + Send + Sync>;
