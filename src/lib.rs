//! # Trellis
//!
//! **Trellis** is a table-driven request dispatcher for Rust: a declarative
//! route table is compiled into an immutable segment trie, and incoming
//! requests are dispatched through it with layered argument resolution,
//! powered by the `may` coroutine runtime.
//!
//! ## Overview
//!
//! Routes are declared as a nested table - route entries
//! `[method, path, handler, middleware?, ...]` grouped under scope entries
//! `[prefix, middleware?, entries...]` - and compiled in three passes:
//!
//! ```text
//! RouteTable ──normalize──▶ Vec<FlatRoute> ──analyze──▶ Vec<AnalyzedHandler>
//!                                                            │
//!                                              Router::compile│
//!                                                            ▼
//!                               Dispatcher ◀── immutable dispatch trie
//! ```
//!
//! - **[`spec`]** - route value types, the nested table grammar, and the
//!   normalizer that flattens it (prefix concatenation, middleware
//!   inheritance, deterministic ordering)
//! - **[`catalog`]** - the handler catalog collaborator: module identifier
//!   → exported handler descriptors, plus the verb-name convention scan
//! - **[`analyzer`]** - per-entry analysis: catalog resolution, metadata
//!   merging, parameter classification, resolver-override merging
//! - **[`resolver`]** - the two-layered argument-resolver registry and the
//!   five-rule precedence algorithm
//! - **[`router`]** - the compiled dispatch trie (literal children, one
//!   variable child per node, accumulated leaf lists keyed by method)
//! - **[`dispatcher`]** - the runtime state machine: segment walk, leaf
//!   selection with filters and ambiguity detection, handler invocation
//! - **[`middleware`]** - compile-time handler decorators
//! - **[`typed`]** - type-safe handler adapters
//!
//! ## Quick Start
//!
//! ```no_run
//! use trellis::catalog::{HandlerDescriptor, ParamSpec, StaticCatalog, ModuleExports};
//! use trellis::dispatcher::{Dispatcher, HandlerKind, HandlerResponse, Request};
//! use trellis::resolver::ResolverRegistry;
//! use trellis::runtime_config::RuntimeConfig;
//! use trellis::spec::{route, HandlerRef, MethodKey, RouteTable};
//! use http::Method;
//! use serde_json::json;
//!
//! let show = HandlerDescriptor::new(
//!     "show",
//!     HandlerKind::sync(|_req, args| HandlerResponse::json(200, json!({ "id": args[0] }))),
//!     vec![ParamSpec::named("id")],
//! );
//! let catalog = StaticCatalog::new()
//!     .module("widgets", ModuleExports::default().export(show));
//!
//! let table = RouteTable::new(vec![
//!     route(
//!         MethodKey::Method(Method::GET),
//!         "/widgets/{id}",
//!         HandlerRef::catalog("widgets", "show"),
//!     )
//!     .into(),
//! ]);
//!
//! let dispatcher = Dispatcher::compile(
//!     &table,
//!     &catalog,
//!     &ResolverRegistry::with_defaults(),
//!     RuntimeConfig::from_env(),
//! )
//! .expect("compile route table");
//!
//! let outcome = dispatcher.dispatch(Request::new(Method::GET, "/widgets/42"));
//! ```
//!
//! ## Dispatch semantics
//!
//! - The trie walk matches literal segments before the variable child and
//!   never backtracks; a miss is a first-class not-found outcome.
//! - Leaf lists accumulate, so several handlers may share a path and
//!   method; their request filters disambiguate per request. Two or more
//!   surviving candidates is a configuration defect reported as an
//!   ambiguous-match error - never resolved by arbitrary selection.
//! - Each handler's declared parameters are resolved once at compile time
//!   into an ordered list of resolver functions; route-path variables bind
//!   by precomputed positional index.
//!
//! ## Runtime Considerations
//!
//! Trellis uses the `may` coroutine runtime, not tokio or async-std. The
//! compiled trie and all leaves are immutable and safe for unsynchronized
//! concurrent reads; dispatch writes only request-scoped data. Coroutine
//! stack size and dispatch mode are configured via `TRELLIS_STACK_SIZE`
//! and `TRELLIS_DISPATCH_MODE` (see [`runtime_config`]).

pub mod analyzer;
pub mod catalog;
pub mod dispatcher;
mod echo;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod resolver;
pub mod router;
pub mod runtime_config;
pub mod spec;
pub mod typed;

pub use echo::echo_handler;
pub use error::{CompileError, DispatchError};
pub use spec::{route, scope, HandlerRef, MethodKey, RouteSpec, RouteTable};
