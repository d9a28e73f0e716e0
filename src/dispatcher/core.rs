//! Dispatcher core - hot path for request dispatch.
//!
//! Holds the request/response value types shared by handlers, filters and
//! resolvers, plus the [`Dispatcher`] itself: the two-phase state machine
//! (segment walk, then leaf selection) that consumes one request at a time
//! against the immutable compiled trie.

use http::Method;
use may::coroutine;
use may::sync::mpsc;
use serde::Serialize;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::analyzer::analyze;
use crate::catalog::HandlerCatalog;
use crate::error::{CompileError, DispatchError};
use crate::ids::RequestId;
use crate::resolver::ResolverRegistry;
use crate::router::{split_path, Leaf, ParamVec, Router};
use crate::runtime_config::{DispatchMode, RuntimeConfig};
use crate::spec::{MethodKey, RouteTable};

/// Maximum inline headers before heap allocation. Most requests carry ≤16.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
///
/// Header names use `Arc<str>` because they repeat across requests and an
/// `Arc` clone is an O(1) atomic increment; values are per-request data and
/// stay `String`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Reply channel sender carried inside every [`HandlerRequest`]. A compiled
/// handler sends exactly one response through it.
pub type ReplySender = mpsc::Sender<HandlerResponse>;

/// A raw synchronous handler: blocks until it produces a response.
///
/// Receives the augmented request and the argument values resolved for its
/// declared parameter list, in declaration order.
pub type SyncHandlerFn = dyn Fn(&HandlerRequest, &[Value]) -> HandlerResponse + Send + Sync;

/// A raw asynchronous handler: returns immediately and delivers its
/// response through the supplied sender when the computation completes.
pub type AsyncHandlerFn = dyn Fn(&HandlerRequest, &[Value], ReplySender) + Send + Sync;

/// A handler callable together with its declared execution form.
///
/// The form is a compile-time property: the trie compiler adapts a `Sync`
/// handler into the uniform channel-speaking shape once at build time, so
/// the dispatcher never branches on it per request.
#[derive(Clone)]
pub enum HandlerKind {
    Sync(Arc<SyncHandlerFn>),
    Async(Arc<AsyncHandlerFn>),
}

impl HandlerKind {
    /// Wrap a plain `Fn(&HandlerRequest, &[Value]) -> HandlerResponse`.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&HandlerRequest, &[Value]) -> HandlerResponse + Send + Sync + 'static,
    {
        HandlerKind::Sync(Arc::new(f))
    }

    /// Wrap an asynchronous handler that replies through the sender.
    pub fn asynchronous<F>(f: F) -> Self
    where
        F: Fn(&HandlerRequest, &[Value], ReplySender) + Send + Sync + 'static,
    {
        HandlerKind::Async(Arc::new(f))
    }
}

/// The uniform compiled-handler shape: consumes the request and responds
/// through `request.reply_tx`. Every leaf stores one of these; middleware
/// wraps this shape, never individual arguments.
pub type BoxedHandler = Arc<dyn Fn(HandlerRequest) + Send + Sync>;

/// Optional per-leaf request predicate, applied during leaf selection
/// before any handler is invoked.
pub type RequestFilter = Arc<dyn Fn(&HandlerRequest) -> bool + Send + Sync>;

/// A parsed incoming request, as handed to the dispatcher by the transport
/// layer. The dispatcher augments it into a [`HandlerRequest`] before any
/// filter or handler sees it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderVec,
    /// Generic key-value parameter map (query params, form fields, ...).
    pub params: Map<String, Value>,
    pub body: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderVec::new(),
            params: Map::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: &str, value: Value) -> Self {
        self.params.insert(name.to_string(), value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Request data passed to filters, resolvers and compiled handlers.
///
/// This is the incoming [`Request`] augmented by the dispatcher with a
/// request id, the matched endpoint name, the extracted route parameters
/// and the accumulated path context, plus the reply channel the handler
/// responds through.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique id minted per dispatch, for log correlation.
    pub request_id: RequestId,
    pub method: Method,
    pub path: String,
    /// Human-readable name of the matched endpoint, e.g. `GET /widgets/{id}`.
    pub endpoint: String,
    pub headers: HeaderVec,
    pub params: Map<String, Value>,
    pub body: Option<Value>,
    /// Route parameters bound from path variables, in path order.
    pub route_params: ParamVec,
    /// Accumulated group-prefix context, recorded by the compiled handler
    /// for downstream introspection.
    pub path_context: String,
    /// Channel for sending the response back to the dispatcher.
    pub reply_tx: ReplySender,
}

impl HandlerRequest {
    /// Get a route parameter by name.
    ///
    /// Last write wins if duplicate names exist at different path depths.
    #[inline]
    #[must_use]
    pub fn get_route_param(&self, name: &str) -> Option<&str> {
        self.route_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert route_params to a HashMap for compatibility.
    /// Note: this allocates - use get_route_param() in hot paths.
    #[must_use]
    pub fn route_params_map(&self) -> HashMap<String, String> {
        self.route_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Convert headers to a HashMap for compatibility.
    /// Note: this allocates - use get_header() in hot paths.
    #[must_use]
    pub fn headers_map(&self) -> HashMap<String, String> {
        self.headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Response produced by a handler: status, headers, JSON body.
///
/// The dispatcher treats the body as opaque; whatever the handler chain
/// returns is passed back to the caller verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A JSON response with the content-type header preset.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive name match).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Outcome of a blocking dispatch. A miss is a first-class outcome, not an
/// error; the caller maps it to its own not-found behavior.
#[derive(Debug)]
pub enum DispatchOutcome {
    Response(HandlerResponse),
    NotFound,
}

/// Outcome of an asynchronous dispatch: either no match, or a pending
/// computation the caller completes by receiving on the reply channel.
pub enum AsyncOutcome {
    NotFound,
    Pending {
        endpoint: String,
        reply: mpsc::Receiver<HandlerResponse>,
    },
}

/// Runtime dispatcher over a compiled route trie.
///
/// The trie and every leaf are immutable once compiled; dispatch reads the
/// shared structure and writes only request-scoped data, so no locks are
/// taken on the hot path and concurrent dispatches need no synchronization.
#[derive(Clone)]
pub struct Dispatcher {
    router: Router,
    mode: DispatchMode,
    stack_size: usize,
}

impl Dispatcher {
    /// Wrap a compiled router with the given runtime configuration.
    #[must_use]
    pub fn new(router: Router, config: RuntimeConfig) -> Self {
        Self {
            router,
            mode: config.dispatch_mode,
            stack_size: config.stack_size,
        }
    }

    /// Compile a route table end to end: normalize, analyze against the
    /// catalog and resolver registry, build the trie, and wrap it in a
    /// dispatcher.
    ///
    /// This is the one-time, single-threaded build step; it is not
    /// re-entered once the dispatcher starts serving.
    pub fn compile(
        table: &RouteTable,
        catalog: &dyn HandlerCatalog,
        registry: &ResolverRegistry,
        config: RuntimeConfig,
    ) -> Result<Self, CompileError> {
        let flat = crate::spec::normalize(table)?;
        let analyzed = analyze(flat, catalog, registry)?;
        let router = Router::compile(analyzed)?;
        Ok(Self::new(router, config))
    }

    /// Access the underlying router (diagnostics, route dumps).
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatch a request and block until the handler responds.
    pub fn dispatch(&self, req: Request) -> Result<DispatchOutcome, DispatchError> {
        match self.dispatch_async(req)? {
            AsyncOutcome::NotFound => Ok(DispatchOutcome::NotFound),
            AsyncOutcome::Pending { endpoint, reply } => match reply.recv() {
                Ok(resp) => Ok(DispatchOutcome::Response(resp)),
                Err(_) => {
                    error!(
                        endpoint = %endpoint,
                        "handler reply channel closed without a response"
                    );
                    Err(DispatchError::ChannelClosed { endpoint })
                }
            },
        }
    }

    /// Dispatch a request without waiting for the response.
    ///
    /// In coroutine mode the selected handler runs on its own coroutine; in
    /// blocking mode it has already completed by the time this returns and
    /// the reply channel is ready to receive. Leaf selection - including
    /// ambiguity detection - always completes before any handler runs.
    pub fn dispatch_async(&self, req: Request) -> Result<AsyncOutcome, DispatchError> {
        let Request {
            method,
            path,
            headers,
            params,
            body,
        } = req;

        let request_id = RequestId::new();
        debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            "route match attempt"
        );
        let match_start = Instant::now();

        let segments = split_path(&path);
        let Some(node) = self.router.walk(&segments) else {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                duration_us = match_start.elapsed().as_micros() as u64,
                "no route matched"
            );
            return Ok(AsyncOutcome::NotFound);
        };

        let method_key = MethodKey::Method(method.clone());
        let mut candidates: Vec<&Leaf> = Vec::new();
        candidates.extend(node.leaves_for(&method_key));
        candidates.extend(node.leaves_for(&MethodKey::Any));
        if candidates.is_empty() {
            info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "path matched but no leaf for method"
            );
            return Ok(AsyncOutcome::NotFound);
        }

        let (reply_tx, reply_rx) = mpsc::channel();
        let mut hreq = HandlerRequest {
            request_id,
            method,
            path: path.clone(),
            endpoint: String::new(),
            headers,
            params,
            body,
            route_params: ParamVec::new(),
            path_context: String::new(),
            reply_tx,
        };

        let surviving: Vec<&Leaf> = candidates
            .into_iter()
            .filter(|leaf| leaf.accepts(&hreq))
            .collect();

        let leaf = match surviving.as_slice() {
            [] => {
                info!(
                    request_id = %request_id,
                    method = %hreq.method,
                    path = %hreq.path,
                    "all candidate leaves rejected by filters"
                );
                return Ok(AsyncOutcome::NotFound);
            }
            [leaf] => *leaf,
            many => {
                let endpoints: Vec<String> =
                    many.iter().map(|l| l.endpoint.clone()).collect();
                error!(
                    request_id = %request_id,
                    method = %hreq.method,
                    path = %hreq.path,
                    endpoints = ?endpoints,
                    "ambiguous match - conflicting endpoints"
                );
                return Err(DispatchError::AmbiguousMatch {
                    method: hreq.method.to_string(),
                    path: hreq.path.clone(),
                    endpoints,
                });
            }
        };

        // Route params are extracted by positional index into the already
        // split path, in path order, never by re-matching names.
        for (name, idx) in &leaf.param_table {
            if let Some(value) = segments.get(*idx) {
                hreq.route_params
                    .push((name.clone(), (*value).to_string()));
            }
        }
        hreq.endpoint = leaf.endpoint.clone();

        info!(
            request_id = %request_id,
            endpoint = %leaf.endpoint,
            route_params = ?hreq.route_params,
            duration_us = match_start.elapsed().as_micros() as u64,
            "route matched"
        );

        let endpoint = leaf.endpoint.clone();
        match self.mode {
            DispatchMode::Blocking => (leaf.handler)(hreq),
            DispatchMode::Coroutine => {
                let handler = leaf.handler.clone();
                // SAFETY: may::coroutine::Builder::spawn() is marked unsafe
                // by the may runtime. The handler closure is Send + 'static,
                // owns its request outright, and replies through the channel
                // rather than by unwinding across the coroutine boundary.
                let spawned = unsafe {
                    coroutine::Builder::new()
                        .stack_size(self.stack_size)
                        .spawn(move || handler(hreq))
                };
                if let Err(e) = spawned {
                    error!(
                        request_id = %request_id,
                        endpoint = %endpoint,
                        error = %e,
                        "failed to spawn handler coroutine"
                    );
                    return Err(DispatchError::Spawn {
                        endpoint,
                        source: e,
                    });
                }
            }
        }

        Ok(AsyncOutcome::Pending {
            endpoint,
            reply: reply_rx,
        })
    }
}
