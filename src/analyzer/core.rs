use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::catalog::{HandlerCatalog, HandlerDescriptor, ModuleExports, ParamSpec};
use crate::dispatcher::{HandlerKind, RequestFilter};
use crate::error::CompileError;
use crate::middleware::MiddlewareChain;
use crate::resolver::ResolverRegistry;
use crate::spec::{FlatRoute, HandlerRef, RouteSpec};

/// One analyzed endpoint: the flat entry with its handler reference
/// resolved, metadata merged, parameters classified and its resolver
/// registry fully combined. Pure data consumed by the trie compiler.
#[derive(Clone)]
pub struct AnalyzedHandler {
    pub spec: RouteSpec,
    /// Human-readable endpoint name, e.g. `GET /widgets/{id}`.
    pub endpoint: String,
    pub handler_name: String,
    pub handler: HandlerKind,
    /// Declared parameter list (first arity only).
    pub params: Vec<ParamSpec>,
    /// Ordered names of the path variables of this route.
    pub route_params: Vec<String>,
    /// Base registry combined with handler- and call-site overrides.
    pub registry: ResolverRegistry,
    /// Module defaults shallow-merged under handler metadata.
    pub metadata: Map<String, Value>,
    pub middleware: MiddlewareChain,
    pub filter: Option<RequestFilter>,
    pub context: String,
}

impl std::fmt::Debug for AnalyzedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzedHandler")
            .field("spec", &self.spec)
            .field("endpoint", &self.endpoint)
            .field("handler_name", &self.handler_name)
            .field("params", &self.params)
            .field("route_params", &self.route_params)
            .field("metadata", &self.metadata)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl AnalyzedHandler {
    /// Declared parameters that do not coincide with a path variable and
    /// therefore need a registry-driven resolver.
    #[must_use]
    pub fn free_params(&self) -> Vec<&ParamSpec> {
        self.params
            .iter()
            .filter(|p| {
                p.identifier()
                    .map_or(true, |ident| !self.route_params.iter().any(|r| r == ident))
            })
            .collect()
    }
}

/// Analyze every flat entry against the catalog and the base resolver
/// registry.
///
/// Catalog modules are loaded at most once per analysis run. A module that
/// fails to load aborts the whole analysis with an error naming the route
/// that required it.
pub fn analyze(
    flat: Vec<FlatRoute>,
    catalog: &dyn HandlerCatalog,
    base: &ResolverRegistry,
) -> Result<Vec<AnalyzedHandler>, CompileError> {
    let mut modules: HashMap<String, ModuleExports> = HashMap::new();
    flat.into_iter()
        .map(|entry| analyze_entry(entry, catalog, base, &mut modules))
        .collect()
}

fn analyze_entry(
    entry: FlatRoute,
    catalog: &dyn HandlerCatalog,
    base: &ResolverRegistry,
    modules: &mut HashMap<String, ModuleExports>,
) -> Result<AnalyzedHandler, CompileError> {
    let endpoint = entry.spec.to_string();

    let (descriptor, module_metadata) = match &entry.handler {
        HandlerRef::Inline(descriptor) => (descriptor.clone(), Map::new()),
        HandlerRef::Catalog { module, name } => {
            let exports = load_module(module, catalog, modules, &endpoint)?;
            let descriptor = exports.handlers.get(name).cloned().ok_or_else(|| {
                CompileError::HandlerNotFound {
                    module: module.clone(),
                    name: name.clone(),
                    route: endpoint.clone(),
                }
            })?;
            (descriptor, exports.metadata)
        }
    };

    let params = first_arity(&descriptor, &endpoint)?;
    let metadata = shallow_merge(module_metadata, descriptor.metadata.clone());

    let mut registry = base.clone();
    if let Some(overrides) = &descriptor.resolvers {
        registry = registry.merge(overrides);
    }
    if let Some(overrides) = &entry.resolvers {
        registry = registry.merge(overrides);
    }

    let route_params = entry.spec.variable_names();
    debug!(
        endpoint = %endpoint,
        handler = %descriptor.name,
        declared_params = params.len(),
        route_params = route_params.len(),
        "entry analyzed"
    );

    Ok(AnalyzedHandler {
        spec: entry.spec,
        endpoint,
        handler_name: descriptor.name,
        handler: descriptor.handler,
        params,
        route_params,
        registry,
        metadata,
        middleware: entry.middleware,
        filter: entry.filter,
        context: entry.context,
    })
}

fn load_module(
    module: &str,
    catalog: &dyn HandlerCatalog,
    modules: &mut HashMap<String, ModuleExports>,
    route: &str,
) -> Result<ModuleExports, CompileError> {
    if let Some(exports) = modules.get(module) {
        return Ok(exports.clone());
    }
    let exports = catalog.load(module).map_err(|e| CompileError::ModuleLoad {
        module: module.to_string(),
        route: route.to_string(),
        reason: e.to_string(),
    })?;
    modules.insert(module.to_string(), exports.clone());
    Ok(exports)
}

/// Only the first declared arity is honored when several are present.
fn first_arity(
    descriptor: &HandlerDescriptor,
    endpoint: &str,
) -> Result<Vec<ParamSpec>, CompileError> {
    descriptor
        .arities
        .first()
        .cloned()
        .ok_or_else(|| CompileError::NoArity {
            name: descriptor.name.clone(),
            route: endpoint.to_string(),
        })
}

/// Shallow merge: handler-level keys win; nested map values are replaced
/// wholesale, never deep-merged.
fn shallow_merge(base: Map<String, Value>, winner: Map<String, Value>) -> Map<String, Value> {
    let mut merged = base;
    for (key, value) in winner {
        merged.insert(key, value);
    }
    merged
}
