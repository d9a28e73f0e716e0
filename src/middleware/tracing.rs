use std::sync::Arc;
use std::time::Instant;

use tracing::{info, info_span};

use super::Middleware;
use crate::dispatcher::{BoxedHandler, HandlerRequest};

/// Logs entry and exit of the wrapped handler inside a request span.
///
/// For an asynchronous handler the exit line marks hand-off to the pending
/// computation, not response delivery; response latency is logged by the
/// dispatcher when the reply arrives.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn wrap(&self, next: BoxedHandler) -> Option<BoxedHandler> {
        Some(Arc::new(move |req: HandlerRequest| {
            let span = info_span!(
                "request",
                request_id = %req.request_id,
                method = %req.method,
                path = %req.path,
                endpoint = %req.endpoint
            );
            let _guard = span.enter();
            let start = Instant::now();
            next(req);
            info!(
                elapsed_us = start.elapsed().as_micros() as u64,
                "handler returned"
            );
        }))
    }
}
