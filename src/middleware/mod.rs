//! Built-in middleware.
//!
//! Middleware are ordinary handlers that call [`Context::next`](crate::Context::next)
//! to run the rest of the chain and then continue, so they can act both
//! before and after the route handler.
//!
//! # Examples
//!
//! ```
//! use gon::middleware::{logger, recovery};
//! use gon::{Engine, Routes};
//!
//! let mut engine = Engine::new();
//! engine.use_middleware(logger()).use_middleware(recovery());
//! ```

pub use self::logger::logger;
pub use self::recovery::recovery;

mod logger;
mod recovery;
