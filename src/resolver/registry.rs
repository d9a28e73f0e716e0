use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::dispatcher::HandlerRequest;

/// Computes one handler parameter's value from a request.
pub type ArgResolver = Arc<dyn Fn(&HandlerRequest) -> Value + Send + Sync>;

/// Produces an [`ArgResolver`] for a given parameter identifier.
pub type ResolverFactory = Arc<dyn Fn(&str) -> ArgResolver + Send + Sync>;

/// A name-keyed registry entry: either a resolver used directly, or a tag
/// indirection into the factory layer.
#[derive(Clone)]
pub enum NameBinding {
    Resolver(ArgResolver),
    Tag(String),
}

/// Two-layered argument-resolver registry.
///
/// Factories are keyed by *tag* and drive annotation-based selection;
/// bindings are keyed by *parameter identifier* and bind by convention.
/// The registry is assembled at compile time; lookups never happen per
/// request.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    factories: HashMap<String, ResolverFactory>,
    bindings: HashMap<String, NameBinding>,
}

impl ResolverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the conventional bindings and factories.
    ///
    /// Name-keyed: `body`, `method`, `path`, `params`, `headers`.
    /// Tag-keyed factories: `param` (request parameter by name) and
    /// `header` (header value by name).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_resolver(
            "body",
            Arc::new(|req: &HandlerRequest| req.body.clone().unwrap_or(Value::Null)),
        );
        registry.register_resolver(
            "method",
            Arc::new(|req: &HandlerRequest| Value::String(req.method.to_string())),
        );
        registry.register_resolver(
            "path",
            Arc::new(|req: &HandlerRequest| Value::String(req.path.clone())),
        );
        registry.register_resolver(
            "params",
            Arc::new(|req: &HandlerRequest| Value::Object(req.params.clone())),
        );
        registry.register_resolver(
            "headers",
            Arc::new(|req: &HandlerRequest| {
                let map = req
                    .headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                    .collect();
                Value::Object(map)
            }),
        );
        registry.register_factory(
            "param",
            Arc::new(|name: &str| {
                let name = name.to_string();
                let resolver: ArgResolver = Arc::new(move |req: &HandlerRequest| {
                    req.params.get(&name).cloned().unwrap_or(Value::Null)
                });
                resolver
            }),
        );
        registry.register_factory(
            "header",
            Arc::new(|name: &str| {
                let name = name.to_string();
                let resolver: ArgResolver = Arc::new(move |req: &HandlerRequest| {
                    req.get_header(&name)
                        .map(|v| Value::String(v.to_string()))
                        .unwrap_or(Value::Null)
                });
                resolver
            }),
        );
        registry
    }

    pub fn register_factory(&mut self, tag: impl Into<String>, factory: ResolverFactory) {
        self.factories.insert(tag.into(), factory);
    }

    pub fn register_resolver(&mut self, name: impl Into<String>, resolver: ArgResolver) {
        self.bindings
            .insert(name.into(), NameBinding::Resolver(resolver));
    }

    /// Bind a parameter name to a tag; resolution recurses into the tag's
    /// factory.
    pub fn register_alias(&mut self, name: impl Into<String>, tag: impl Into<String>) {
        self.bindings.insert(name.into(), NameBinding::Tag(tag.into()));
    }

    #[must_use]
    pub fn factory(&self, tag: &str) -> Option<&ResolverFactory> {
        self.factories.get(tag)
    }

    #[must_use]
    pub fn binding(&self, name: &str) -> Option<&NameBinding> {
        self.bindings.get(name)
    }

    #[must_use]
    pub fn has_factory(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// Combine this registry with an override set according to its mode.
    #[must_use]
    pub fn merge(&self, overrides: &ResolverOverrides) -> ResolverRegistry {
        let over = &overrides.registry;
        match overrides.mode {
            OverrideMode::Merge => {
                let mut merged = self.clone();
                merged
                    .factories
                    .extend(over.factories.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
                    .bindings
                    .extend(over.bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
            }
            OverrideMode::Replace => over.clone(),
            OverrideMode::ReplaceFactories => {
                let mut merged = self.clone();
                merged.factories = over.factories.clone();
                merged
                    .bindings
                    .extend(over.bindings.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
            }
            OverrideMode::ReplaceResolvers => {
                let mut merged = self.clone();
                merged.bindings = over.bindings.clone();
                merged
                    .factories
                    .extend(over.factories.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged
            }
        }
    }
}

/// How an override registry combines with its base. The modes are
/// mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverrideMode {
    /// Key-wise union, override wins on collision.
    #[default]
    Merge,
    /// The override registry fully replaces the base.
    Replace,
    /// The override's tag-keyed entries replace the base's wholesale;
    /// name-keyed entries merge.
    ReplaceFactories,
    /// The override's name-keyed entries replace the base's wholesale;
    /// tag-keyed entries merge.
    ReplaceResolvers,
}

/// An override registry plus its combination mode, declared at handler or
/// call-site level.
#[derive(Clone, Default)]
pub struct ResolverOverrides {
    pub registry: ResolverRegistry,
    pub mode: OverrideMode,
}

impl ResolverOverrides {
    #[must_use]
    pub fn new(registry: ResolverRegistry, mode: OverrideMode) -> Self {
        Self { registry, mode }
    }
}
