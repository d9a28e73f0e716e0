use std::sync::Arc;

use crate::dispatcher::BoxedHandler;

/// A handler decorator applied once at trie-compile time.
///
/// `wrap` receives the handler compiled so far and may return a new handler
/// around it, or `None` to leave the handler unchanged. Middleware wraps
/// the *handler*, not individual arguments: resolved argument values are
/// only visible through the wrapped handler's closure.
pub trait Middleware: Send + Sync {
    fn wrap(&self, next: BoxedHandler) -> Option<BoxedHandler>;
}

/// Ordered middleware chain attached to a route or inherited from an
/// enclosing group. The first entry ends up innermost.
pub type MiddlewareChain = Vec<Arc<dyn Middleware>>;

/// Apply a chain to a handler. Entries that return `None` are skipped.
#[must_use]
pub fn apply_chain(chain: &[Arc<dyn Middleware>], handler: BoxedHandler) -> BoxedHandler {
    let mut wrapped = handler;
    for mw in chain {
        wrapped = mw.wrap(wrapped.clone()).unwrap_or(wrapped);
    }
    wrapped
}
