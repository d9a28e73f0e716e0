//! # Middleware Module
//!
//! Compile-time handler decoration. A middleware is an ordered
//! `(Handler) -> Option<Handler>` transform applied while the trie is
//! built: each entry may wrap the handler compiled so far or return `None`
//! to leave it untouched. Nothing here runs per request beyond the
//! closures the middleware itself installed.

mod core;
mod tracing;

pub use self::tracing::TracingMiddleware;
pub use core::{apply_chain, Middleware, MiddlewareChain};
