//! Compile-time handler composition.
//!
//! Builds each leaf's compiled handler by wrapping, innermost first:
//! resolver-driven argument extraction and invocation of the raw handler;
//! the sync-to-async adaptation (decided here, from the handler's declared
//! kind, never by a runtime branch); the middleware decorator chain; the
//! path-context injection step; and the diagnostics wrapper.

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::core::{BoxedHandler, HandlerKind, HandlerRequest};
use crate::analyzer::AnalyzedHandler;
use crate::error::CompileError;
use crate::middleware::apply_chain;
use crate::resolver::{resolve_params, ArgResolver};
use crate::router::Leaf;

/// Compile one analyzed entry into a trie leaf.
pub(crate) fn compile_leaf(entry: &AnalyzedHandler) -> Result<Leaf, CompileError> {
    let handler = compile_handler(entry)?;
    let param_table: Vec<(Arc<str>, usize)> = entry
        .spec
        .path
        .iter()
        .enumerate()
        .filter_map(|(idx, seg)| seg.variable_name().map(|name| (Arc::<str>::from(name), idx)))
        .collect();
    Ok(Leaf {
        handler,
        endpoint: entry.endpoint.clone(),
        filter: entry.filter.clone(),
        param_table,
    })
}

fn compile_handler(entry: &AnalyzedHandler) -> Result<BoxedHandler, CompileError> {
    let resolvers = resolve_params(
        &entry.params,
        &entry.route_params,
        &entry.registry,
        &entry.endpoint,
    )?;

    // Innermost: extract arguments and invoke the raw handler. A handler
    // declared synchronous is adapted into the channel-speaking shape
    // right here; an asynchronous one already owns the reply sender.
    let invoke: BoxedHandler = match entry.handler.clone() {
        HandlerKind::Sync(f) => Arc::new(move |req: HandlerRequest| {
            let args = resolve_args(&resolvers, &req);
            let response = f(&req, &args);
            let _ = req.reply_tx.send(response);
        }),
        HandlerKind::Async(f) => Arc::new(move |req: HandlerRequest| {
            let args = resolve_args(&resolvers, &req);
            f(&req, &args, req.reply_tx.clone());
        }),
    };

    // Middleware sees post-resolution arguments only through the wrapped
    // handler's closure. First chain entry ends up innermost.
    let wrapped = apply_chain(&entry.middleware, invoke);

    // Record the accumulated group prefix on the request.
    let context = entry.context.clone();
    let with_context: BoxedHandler = Arc::new(move |mut req: HandlerRequest| {
        req.path_context = context.clone();
        wrapped(req);
    });

    // Outermost: diagnostics.
    let endpoint = entry.endpoint.clone();
    Ok(Arc::new(move |req: HandlerRequest| {
        debug!(
            request_id = %req.request_id,
            endpoint = %endpoint,
            "invoking compiled handler"
        );
        with_context(req);
    }))
}

fn resolve_args(resolvers: &[ArgResolver], req: &HandlerRequest) -> Vec<Value> {
    resolvers.iter().map(|resolve| resolve(req)).collect()
}
