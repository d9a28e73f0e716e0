use crate::catalog::HandlerDescriptor;
use crate::dispatcher::RequestFilter;
use crate::middleware::MiddlewareChain;
use crate::resolver::ResolverOverrides;

use super::types::MethodKey;

/// Reference to the handler a route invokes: either an inline descriptor,
/// or a (module, name) pair resolved through the handler catalog during
/// analysis.
#[derive(Clone)]
pub enum HandlerRef {
    Inline(HandlerDescriptor),
    Catalog { module: String, name: String },
}

impl HandlerRef {
    #[must_use]
    pub fn catalog(module: impl Into<String>, name: impl Into<String>) -> Self {
        HandlerRef::Catalog {
            module: module.into(),
            name: name.into(),
        }
    }
}

/// A route entry of the declarative table:
/// `[method, path, handler, middleware?, filter?, resolvers?, nested...]`.
///
/// Nested entries treat this route's full path as their prefix and inherit
/// its effective middleware as their default.
#[derive(Clone)]
pub struct RouteDef {
    pub method: MethodKey,
    pub path: String,
    pub handler: HandlerRef,
    /// Local middleware chain. `None` inherits from the nearest enclosing
    /// group; `Some` overrides it, including `Some(vec![])` to clear it.
    pub middleware: Option<MiddlewareChain>,
    pub filter: Option<RequestFilter>,
    pub resolvers: Option<ResolverOverrides>,
    pub nested: Vec<RouteEntry>,
}

impl RouteDef {
    #[must_use]
    pub fn new(method: MethodKey, path: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            method,
            path: path.into(),
            handler,
            middleware: None,
            filter: None,
            resolvers: None,
            nested: Vec::new(),
        }
    }

    #[must_use]
    pub fn middleware(mut self, chain: MiddlewareChain) -> Self {
        self.middleware = Some(chain);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: RequestFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn resolvers(mut self, overrides: ResolverOverrides) -> Self {
        self.resolvers = Some(overrides);
        self
    }

    #[must_use]
    pub fn nest(mut self, entry: RouteEntry) -> Self {
        self.nested.push(entry);
        self
    }
}

/// A grouping entry: `[path-prefix, middleware?, entries...]`. Pushes its
/// prefix and middleware as defaults for everything nested inside.
#[derive(Clone)]
pub struct ScopeDef {
    pub prefix: String,
    pub middleware: Option<MiddlewareChain>,
    pub entries: Vec<RouteEntry>,
}

impl ScopeDef {
    #[must_use]
    pub fn new(prefix: impl Into<String>, entries: Vec<RouteEntry>) -> Self {
        Self {
            prefix: prefix.into(),
            middleware: None,
            entries,
        }
    }

    #[must_use]
    pub fn middleware(mut self, chain: MiddlewareChain) -> Self {
        self.middleware = Some(chain);
        self
    }
}

/// One entry of the nested table.
#[derive(Clone)]
pub enum RouteEntry {
    Route(RouteDef),
    Scope(ScopeDef),
}

/// The declarative route table handed to the normalizer. An in-process
/// configuration value; there is no wire format.
#[derive(Clone, Default)]
pub struct RouteTable {
    pub entries: Vec<RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }
}

/// Shorthand for a route entry.
#[must_use]
pub fn route(method: MethodKey, path: impl Into<String>, handler: HandlerRef) -> RouteDef {
    RouteDef::new(method, path, handler)
}

/// Shorthand for a grouping entry.
#[must_use]
pub fn scope(prefix: impl Into<String>, entries: Vec<RouteEntry>) -> ScopeDef {
    ScopeDef::new(prefix, entries)
}

impl From<RouteDef> for RouteEntry {
    fn from(def: RouteDef) -> Self {
        RouteEntry::Route(def)
    }
}

impl From<ScopeDef> for RouteEntry {
    fn from(def: ScopeDef) -> Self {
        RouteEntry::Scope(def)
    }
}
