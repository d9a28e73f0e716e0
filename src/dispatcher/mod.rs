//! # Dispatcher Module
//!
//! Request dispatch against the compiled trie, plus the request/response
//! value types and the compile-time handler composition.
//!
//! ## Request flow
//!
//! 1. The segment walk descends the trie one path segment at a time
//!    (literal child over variable child, no backtracking).
//! 2. Leaf selection gathers the terminal node's leaves for the request
//!    method and the any-method key, then applies the leaves' filters.
//!    Exactly one survivor is invoked; zero is a not-found outcome; two or
//!    more is an ambiguous-match error naming the conflicting endpoints.
//!    No handler runs before selection completes.
//! 3. Route parameters are bound by positional index into the split path
//!    and attached to the request, along with the endpoint name and the
//!    accumulated path context.
//!
//! ## Concurrency
//!
//! Every compiled handler speaks the channel form: it consumes the request
//! and sends exactly one response through the request's reply sender. In
//! blocking mode the handler runs inline on the calling thread; in
//! coroutine mode it is spawned on a `may` coroutine with the configured
//! stack size and the caller receives on the reply channel. Which raw
//! handlers need adaptation into this form is decided once, at compile
//! time, from their declared kind.

mod compile;
mod core;

pub(crate) use compile::compile_leaf;
pub use core::{
    AsyncHandlerFn, AsyncOutcome, BoxedHandler, DispatchOutcome, Dispatcher, HandlerKind,
    HandlerRequest, HandlerResponse, HeaderVec, ReplySender, Request, RequestFilter,
    SyncHandlerFn, MAX_INLINE_HEADERS,
};
