//! # Handler Catalog
//!
//! The catalog is the collaborator that stands in for module introspection:
//! given a module identifier it returns the module's default metadata and a
//! mapping from exported identifier to handler descriptor (callable,
//! declared parameter arities, declared metadata). It is consulted only at
//! table-construction and analysis time, never per request.
//!
//! The module also hosts the verb-name convention table that translates a
//! module scan into explicit route entries (`index` → `GET /`, `show` →
//! `GET /{id}`, and so on).

use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::dispatcher::HandlerKind;
use crate::error::CompileError;
use crate::resolver::ResolverOverrides;
use crate::spec::{MethodKey, RouteDef, RouteEntry};

/// How a declared parameter binds to an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamBinding {
    /// A plain identifier.
    Name(String),
    /// A destructuring-style pattern. Resolution uses the designated alias;
    /// a pattern without one is a compile-time error.
    Pattern { alias: Option<String> },
}

/// One declared handler parameter: its binding plus any resolver
/// annotations it carries.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub binding: ParamBinding,
    /// Explicit resolver-tag annotation, if any (precedence rule 2).
    pub tag: Option<String>,
    /// Other annotation tags declared on the parameter (precedence rule 3).
    pub annotations: Vec<String>,
}

impl ParamSpec {
    /// A plain named parameter with no annotations.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            binding: ParamBinding::Name(name.into()),
            tag: None,
            annotations: Vec::new(),
        }
    }

    /// A named parameter carrying an explicit resolver tag.
    #[must_use]
    pub fn tagged(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            binding: ParamBinding::Name(name.into()),
            tag: Some(tag.into()),
            annotations: Vec::new(),
        }
    }

    /// A destructuring pattern resolved through its alias.
    #[must_use]
    pub fn pattern(alias: Option<&str>) -> Self {
        Self {
            binding: ParamBinding::Pattern {
                alias: alias.map(str::to_string),
            },
            tag: None,
            annotations: Vec::new(),
        }
    }

    /// Attach annotation tags (builder style).
    #[must_use]
    pub fn with_annotations(mut self, annotations: &[&str]) -> Self {
        self.annotations = annotations.iter().map(|a| (*a).to_string()).collect();
        self
    }

    /// The identifier rule evaluation runs against: the name, or the
    /// pattern's alias. `None` for an alias-less pattern.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match &self.binding {
            ParamBinding::Name(name) => Some(name),
            ParamBinding::Pattern { alias } => alias.as_deref(),
        }
    }
}

/// An exported handler as the catalog describes it: the callable, its
/// declared parameter arities, declared metadata, and optional
/// handler-level resolver overrides.
#[derive(Clone)]
pub struct HandlerDescriptor {
    pub name: String,
    pub handler: HandlerKind,
    /// Declared parameter lists. Only the first arity is honored when
    /// several are present (documented simplification).
    pub arities: Vec<Vec<ParamSpec>>,
    pub metadata: Map<String, Value>,
    pub resolvers: Option<ResolverOverrides>,
}

impl HandlerDescriptor {
    /// Descriptor for a single-arity handler with no metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, handler: HandlerKind, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.into(),
            handler,
            arities: vec![params],
            metadata: Map::new(),
            resolvers: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_arity(mut self, params: Vec<ParamSpec>) -> Self {
        self.arities.push(params);
        self
    }

    #[must_use]
    pub fn with_resolvers(mut self, overrides: ResolverOverrides) -> Self {
        self.resolvers = Some(overrides);
        self
    }
}

/// Everything a module exports: module-level default metadata plus its
/// handler descriptors keyed by exported identifier.
#[derive(Clone, Default)]
pub struct ModuleExports {
    pub metadata: Map<String, Value>,
    pub handlers: HashMap<String, HandlerDescriptor>,
}

impl ModuleExports {
    #[must_use]
    pub fn new(metadata: Map<String, Value>) -> Self {
        Self {
            metadata,
            handlers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn export(mut self, descriptor: HandlerDescriptor) -> Self {
        self.handlers.insert(descriptor.name.clone(), descriptor);
        self
    }
}

/// Catalog collaborator: module identifier → exports.
///
/// Loading happens during the one-time build step; implementations may hit
/// the filesystem or other slow sources, and may fail with whatever error
/// fits - analysis wraps the failure into a structural error naming the
/// offending route.
pub trait HandlerCatalog: Send + Sync {
    fn load(&self, module: &str) -> anyhow::Result<ModuleExports>;
}

/// In-memory catalog for embedded use and tests.
#[derive(Clone, Default)]
pub struct StaticCatalog {
    modules: HashMap<String, ModuleExports>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn module(mut self, name: impl Into<String>, exports: ModuleExports) -> Self {
        self.modules.insert(name.into(), exports);
        self
    }
}

impl HandlerCatalog for StaticCatalog {
    fn load(&self, module: &str) -> anyhow::Result<ModuleExports> {
        self.modules
            .get(module)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown module `{module}`"))
    }
}

/// Verb-name convention table: exported identifier → (method, path suffix).
const CONVENTIONS: &[(&str, &str, &str)] = &[
    ("index", "GET", ""),
    ("show", "GET", "{id}"),
    ("create", "POST", ""),
    ("destroy", "DELETE", "{id}"),
    ("modify", "PUT", "{id}"),
    ("patch", "PATCH", "{id}"),
];

/// Translate a convention-based module scan into explicit route entries.
///
/// Exports named after the convention table become routes under `prefix`;
/// other exports are ignored. The returned entries reference the catalog,
/// so analysis re-resolves them against the same module.
pub fn resource_entries(
    prefix: &str,
    module: &str,
    catalog: &dyn HandlerCatalog,
) -> Result<Vec<RouteEntry>, CompileError> {
    let exports = catalog.load(module).map_err(|e| CompileError::ModuleLoad {
        module: module.to_string(),
        route: format!("resources {prefix}"),
        reason: e.to_string(),
    })?;

    let mut entries = Vec::new();
    for (export, verb, suffix) in CONVENTIONS {
        if !exports.handlers.contains_key(*export) {
            continue;
        }
        let method: Method = verb.parse().unwrap_or(Method::GET);
        let path = if suffix.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}/{suffix}")
        };
        entries.push(RouteEntry::Route(RouteDef::new(
            MethodKey::Method(method),
            path,
            crate::spec::HandlerRef::Catalog {
                module: module.to_string(),
                name: (*export).to_string(),
            },
        )));
    }
    Ok(entries)
}
