//! Error types for table compilation and request dispatch.
//!
//! The taxonomy follows two severities: [`CompileError`] values are fatal at
//! build time and prevent dispatcher construction; [`DispatchError`] values
//! surface configuration defects lazily at request time. A request that
//! matches no route is *not* an error - see
//! [`DispatchOutcome::NotFound`](crate::dispatcher::DispatchOutcome).

use thiserror::Error;

/// Structural errors raised while compiling a route table into a dispatcher.
///
/// Every variant names the offending route, parameter, or module so the
/// configuration defect can be located without re-running under a debugger.
#[derive(Debug, Error)]
pub enum CompileError {
    /// A path string in the route table could not be parsed.
    #[error("invalid path pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A variable name appears more than once in a single path.
    #[error("duplicate variable `{name}` in path `{pattern}`")]
    DuplicateVariable { name: String, pattern: String },

    /// The handler catalog failed to load a module required by a route.
    #[error("module `{module}` could not be loaded for `{route}`: {reason}")]
    ModuleLoad {
        module: String,
        route: String,
        reason: String,
    },

    /// A route references an identifier the loaded module does not export.
    #[error("module `{module}` has no handler `{name}` for `{route}`")]
    HandlerNotFound {
        module: String,
        name: String,
        route: String,
    },

    /// A handler declares no parameter arity at all.
    #[error("handler `{name}` for `{route}` declares no parameter list")]
    NoArity { name: String, route: String },

    /// A parameter carries two or more recognized resolver tags.
    #[error("ambiguous resolver tags {tags:?} on parameter `{param}` of `{endpoint}`")]
    AmbiguousTags {
        tags: Vec<String>,
        param: String,
        endpoint: String,
    },

    /// A resolver tag denotes neither a registered factory nor a resolver.
    #[error("unknown resolver tag `{tag}` on parameter `{param}` of `{endpoint}`")]
    UnknownTag {
        tag: String,
        param: String,
        endpoint: String,
    },

    /// No resolution rule applies to a declared parameter.
    #[error("parameter `{param}` of `{endpoint}` cannot be resolved")]
    UnresolvableParam { param: String, endpoint: String },

    /// A destructuring-style parameter declares no alias identifier.
    #[error("destructured parameter of `{endpoint}` has no alias")]
    MissingAlias { endpoint: String },
}

/// Request-time errors. Only configuration defects surfaced lazily live
/// here; a plain miss is reported through the dispatch outcome instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// More than one leaf survived filtering for a single request.
    ///
    /// Equivalent in severity to a compile-time error: static analysis
    /// cannot always detect filter-based overlaps ahead of time, so the
    /// defect is reported the first time a request exposes it. The
    /// conflicting endpoint names are carried for diagnostics.
    #[error("ambiguous match for {method} {path}: conflicting endpoints {endpoints:?}")]
    AmbiguousMatch {
        method: String,
        path: String,
        endpoints: Vec<String>,
    },

    /// The handler's reply channel closed without a response.
    #[error("handler for `{endpoint}` closed its reply channel without responding")]
    ChannelClosed { endpoint: String },

    /// The coroutine runtime refused to spawn the handler.
    #[error("failed to spawn handler coroutine for `{endpoint}`: {source}")]
    Spawn {
        endpoint: String,
        source: std::io::Error,
    },
}
