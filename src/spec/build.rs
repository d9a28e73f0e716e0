use tracing::debug;

use super::table::{HandlerRef, RouteEntry, RouteTable};
use super::types::{format_path, parse_path, PathVec, RouteSpec};
use crate::dispatcher::RequestFilter;
use crate::error::CompileError;
use crate::middleware::MiddlewareChain;
use crate::resolver::ResolverOverrides;

/// One flattened endpoint: the fully resolved route spec plus everything
/// the analyzer needs. Created once at compile time, immutable thereafter.
#[derive(Clone)]
pub struct FlatRoute {
    pub spec: RouteSpec,
    pub handler: HandlerRef,
    pub middleware: MiddlewareChain,
    pub filter: Option<RequestFilter>,
    pub resolvers: Option<ResolverOverrides>,
    /// Path context inherited from enclosing groups, e.g. `/api`. Empty
    /// for routes declared at the table root.
    pub context: String,
}

/// Flatten a nested route table into an ordered list of entries.
///
/// Group prefixes concatenate by simple sequence append; middleware is
/// inherited from the nearest enclosing group unless an entry declares its
/// own. The result is sorted with the two-level comparator (path segments,
/// then method name) - ordering only affects presentation and diagnostics,
/// the compiled trie does not depend on it. The sort is stable, so entries
/// sharing a route spec keep their declaration order.
pub fn normalize(table: &RouteTable) -> Result<Vec<FlatRoute>, CompileError> {
    let mut flat = Vec::new();
    let empty_chain = MiddlewareChain::new();
    for entry in &table.entries {
        flatten(entry, &PathVec::new(), &empty_chain, &mut flat)?;
    }
    flat.sort_by(|a, b| a.spec.cmp(&b.spec));
    debug!(entries = flat.len(), "route table normalized");
    Ok(flat)
}

fn flatten(
    entry: &RouteEntry,
    prefix: &PathVec,
    inherited: &MiddlewareChain,
    out: &mut Vec<FlatRoute>,
) -> Result<(), CompileError> {
    match entry {
        RouteEntry::Scope(scope) => {
            let local = parse_path(&scope.prefix)?;
            let full = concat(prefix, &local);
            ensure_unique_variables(&full)?;
            let chain = scope.middleware.as_ref().unwrap_or(inherited);
            for nested in &scope.entries {
                flatten(nested, &full, chain, out)?;
            }
            Ok(())
        }
        RouteEntry::Route(route) => {
            let local = parse_path(&route.path)?;
            let full = concat(prefix, &local);
            ensure_unique_variables(&full)?;
            let chain = route
                .middleware
                .clone()
                .unwrap_or_else(|| inherited.clone());
            out.push(FlatRoute {
                spec: RouteSpec::new(route.method.clone(), full.clone()),
                handler: route.handler.clone(),
                middleware: chain.clone(),
                filter: route.filter.clone(),
                resolvers: route.resolvers.clone(),
                context: context_string(prefix),
            });
            // A route with nested entries also acts as a group: its full
            // path becomes their prefix, its effective middleware their
            // default.
            for nested in &route.nested {
                flatten(nested, &full, &chain, out)?;
            }
            Ok(())
        }
    }
}

fn concat(prefix: &PathVec, local: &PathVec) -> PathVec {
    let mut full = prefix.clone();
    full.extend(local.iter().cloned());
    full
}

fn context_string(prefix: &PathVec) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        format_path(prefix)
    }
}

/// Variable names must stay unique after prefix concatenation; parse-time
/// checks only cover each piece in isolation.
fn ensure_unique_variables(path: &PathVec) -> Result<(), CompileError> {
    let mut seen: Vec<&str> = Vec::new();
    for segment in path {
        if let Some(name) = segment.variable_name() {
            if seen.contains(&name) {
                return Err(CompileError::DuplicateVariable {
                    name: name.to_string(),
                    pattern: format_path(path),
                });
            }
            seen.push(name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::HandlerDescriptor;
    use crate::dispatcher::{HandlerKind, HandlerResponse};
    use crate::spec::table::{route, scope};
    use crate::spec::types::MethodKey;
    use http::Method;
    use serde_json::json;

    fn noop() -> HandlerRef {
        HandlerRef::Inline(HandlerDescriptor::new(
            "noop",
            HandlerKind::sync(|_req, _args| HandlerResponse::json(200, json!({}))),
            vec![],
        ))
    }

    #[test]
    fn test_scope_prefix_concatenation() {
        let table = RouteTable::new(vec![scope(
            "/api",
            vec![route(MethodKey::Method(Method::GET), "/widgets/{id}", noop()).into()],
        )
        .into()]);
        let flat = normalize(&table).unwrap();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].spec.to_string(), "GET /api/widgets/{id}");
        assert_eq!(flat[0].context, "/api");
    }

    #[test]
    fn test_duplicate_variable_across_scope_rejected() {
        let table = RouteTable::new(vec![scope(
            "/{id}",
            vec![route(MethodKey::Method(Method::GET), "/x/{id}", noop()).into()],
        )
        .into()]);
        assert!(matches!(
            normalize(&table),
            Err(CompileError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn test_ordering_variable_before_literal() {
        let table = RouteTable::new(vec![
            route(MethodKey::Method(Method::GET), "/w/all", noop()).into(),
            route(MethodKey::Method(Method::GET), "/w/{id}", noop()).into(),
        ]);
        let flat = normalize(&table).unwrap();
        assert_eq!(flat[0].spec.to_string(), "GET /w/{id}");
        assert_eq!(flat[1].spec.to_string(), "GET /w/all");
    }
}
