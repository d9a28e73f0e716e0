use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::registry::{ArgResolver, NameBinding, ResolverRegistry};
use crate::catalog::ParamSpec;
use crate::error::CompileError;

/// Resolve every declared parameter of one handler into a plain ordered
/// list of resolver functions.
///
/// Runs once at compile time; the returned list is closed over by the
/// compiled handler and never re-inspected per request. Precedence, first
/// match wins:
///
/// 1. the identifier names a route-path variable - read it from the
///    request's bound route parameters by precomputed position;
/// 2. an explicit resolver-tag annotation - factory lookup, falling back
///    to a directly registered resolver under that tag;
/// 3. exactly one recognized tag among the parameter's annotations - same
///    factory lookup; two or more recognized tags is an error;
/// 4. the identifier itself is name-keyed in the registry - a tag-valued
///    entry recurses into factory lookup, a resolver is used directly;
/// 5. otherwise the parameter is unresolvable and compilation fails.
pub fn resolve_params(
    params: &[ParamSpec],
    route_params: &[String],
    registry: &ResolverRegistry,
    endpoint: &str,
) -> Result<Vec<ArgResolver>, CompileError> {
    params
        .iter()
        .map(|param| resolve_param(param, route_params, registry, endpoint))
        .collect()
}

fn resolve_param(
    param: &ParamSpec,
    route_params: &[String],
    registry: &ResolverRegistry,
    endpoint: &str,
) -> Result<ArgResolver, CompileError> {
    let Some(ident) = param.identifier() else {
        return Err(CompileError::MissingAlias {
            endpoint: endpoint.to_string(),
        });
    };

    // Rule 1: route-path variable. The position is fixed here, at compile
    // time; the request-time read is a plain index.
    if let Some(position) = route_params.iter().position(|name| name == ident) {
        debug!(param = %ident, endpoint = %endpoint, position, "bound as route param");
        return Ok(Arc::new(move |req| {
            req.route_params
                .get(position)
                .map(|(_, v)| Value::String(v.clone()))
                .unwrap_or(Value::Null)
        }));
    }

    // Rule 2: explicit resolver-tag annotation.
    if let Some(tag) = &param.tag {
        return instantiate_tag(tag, ident, registry, endpoint);
    }

    // Rule 3: exactly one recognized annotation tag.
    let recognized: Vec<&String> = param
        .annotations
        .iter()
        .filter(|a| registry.has_factory(a))
        .collect();
    match recognized.as_slice() {
        [] => {}
        [tag] => return instantiate_tag(tag, ident, registry, endpoint),
        many => {
            return Err(CompileError::AmbiguousTags {
                tags: many.iter().map(|t| (*t).clone()).collect(),
                param: ident.to_string(),
                endpoint: endpoint.to_string(),
            })
        }
    }

    // Rule 4: name-keyed registry entry.
    match registry.binding(ident) {
        Some(NameBinding::Resolver(resolver)) => {
            debug!(param = %ident, endpoint = %endpoint, "bound by name");
            return Ok(resolver.clone());
        }
        Some(NameBinding::Tag(tag)) => {
            return instantiate_tag(tag, ident, registry, endpoint);
        }
        None => {}
    }

    // Rule 5: nothing applies.
    Err(CompileError::UnresolvableParam {
        param: ident.to_string(),
        endpoint: endpoint.to_string(),
    })
}

/// Factory lookup for a tag: a registered factory is instantiated with the
/// parameter identifier; a resolver registered directly under the tag is
/// used as-is; anything else is an unknown tag.
fn instantiate_tag(
    tag: &str,
    ident: &str,
    registry: &ResolverRegistry,
    endpoint: &str,
) -> Result<ArgResolver, CompileError> {
    if let Some(factory) = registry.factory(tag) {
        debug!(param = %ident, tag = %tag, endpoint = %endpoint, "bound via factory");
        return Ok(factory(ident));
    }
    if let Some(NameBinding::Resolver(resolver)) = registry.binding(tag) {
        debug!(param = %ident, tag = %tag, endpoint = %endpoint, "bound via tagged resolver");
        return Ok(resolver.clone());
    }
    Err(CompileError::UnknownTag {
        tag: tag.to_string(),
        param: ident.to_string(),
        endpoint: endpoint.to_string(),
    })
}
