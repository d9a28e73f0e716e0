//! Tests for the table normalizer: prefix concatenation, middleware
//! inheritance, and the deterministic two-level ordering.

use std::sync::Arc;

use trellis::dispatcher::BoxedHandler;
use trellis::error::CompileError;
use trellis::middleware::Middleware;
use trellis::spec::{normalize, route, scope, RouteTable};

mod common;

struct NoopMiddleware;

impl Middleware for NoopMiddleware {
    fn wrap(&self, _next: BoxedHandler) -> Option<BoxedHandler> {
        None
    }
}

fn noop_chain(n: usize) -> Vec<Arc<dyn Middleware>> {
    (0..n)
        .map(|_| Arc::new(NoopMiddleware) as Arc<dyn Middleware>)
        .collect()
}

fn handler() -> trellis::spec::HandlerRef {
    common::inline("noop", vec![], |_req, _args| {
        trellis::dispatcher::HandlerResponse::json(200, serde_json::json!({}))
    })
}

#[test]
fn test_nested_scopes_concatenate_prefixes() {
    let table = RouteTable::new(vec![scope(
        "/api",
        vec![scope(
            "/v1",
            vec![route(common::get(), "/widgets/{id}", handler()).into()],
        )
        .into()],
    )
    .into()]);

    let flat = normalize(&table).unwrap();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0].spec.to_string(), "GET /api/v1/widgets/{id}");
    assert_eq!(flat[0].context, "/api/v1");
}

#[test]
fn test_middleware_inherited_from_nearest_group() {
    let table = RouteTable::new(vec![scope(
        "/outer",
        vec![
            route(common::get(), "/plain", handler()).into(),
            route(common::get(), "/own", handler())
                .middleware(noop_chain(3))
                .into(),
            scope("/inner", vec![route(common::get(), "/deep", handler()).into()])
                .middleware(noop_chain(2))
                .into(),
        ],
    )
    .middleware(noop_chain(1))
    .into()]);

    let flat = normalize(&table).unwrap();
    let by_path = |suffix: &str| {
        flat.iter()
            .find(|f| f.spec.to_string().ends_with(suffix))
            .unwrap()
    };

    assert_eq!(by_path("/outer/plain").middleware.len(), 1, "inherited");
    assert_eq!(by_path("/outer/own").middleware.len(), 3, "local override");
    assert_eq!(
        by_path("/outer/inner/deep").middleware.len(),
        2,
        "nearest enclosing group wins"
    );
}

#[test]
fn test_empty_local_middleware_clears_inherited() {
    let table = RouteTable::new(vec![scope(
        "/g",
        vec![route(common::get(), "/r", handler())
            .middleware(noop_chain(0))
            .into()],
    )
    .middleware(noop_chain(2))
    .into()]);

    let flat = normalize(&table).unwrap();
    assert!(flat[0].middleware.is_empty());
}

#[test]
fn test_route_with_nested_entries_acts_as_group() {
    let table = RouteTable::new(vec![route(common::get(), "/parent", handler())
        .middleware(noop_chain(2))
        .nest(route(common::post(), "/child", handler()).into())
        .into()]);

    let flat = normalize(&table).unwrap();
    assert_eq!(flat.len(), 2);
    let child = flat
        .iter()
        .find(|f| f.spec.to_string() == "POST /parent/child")
        .unwrap();
    assert_eq!(child.middleware.len(), 2);
    assert_eq!(child.context, "/parent");
}

#[test]
fn test_two_level_ordering() {
    let table = RouteTable::new(vec![
        route(common::post(), "/w", handler()).into(),
        route(common::get(), "/w/all", handler()).into(),
        route(common::get(), "/w/{id}", handler()).into(),
        route(common::get(), "/w", handler()).into(),
        route(common::get(), "/a", handler()).into(),
    ]);

    let flat = normalize(&table).unwrap();
    let order: Vec<String> = flat.iter().map(|f| f.spec.to_string()).collect();
    assert_eq!(
        order,
        vec![
            "GET /a",
            "GET /w",
            "POST /w",
            "GET /w/{id}",
            "GET /w/all",
        ]
    );
}

#[test]
fn test_stable_order_for_equal_specs() {
    let table = RouteTable::new(vec![
        route(common::get(), "/w", common::inline("first", vec![], |_r, _a| {
            trellis::dispatcher::HandlerResponse::json(200, serde_json::json!({}))
        }))
        .into(),
        route(common::get(), "/w", common::inline("second", vec![], |_r, _a| {
            trellis::dispatcher::HandlerResponse::json(200, serde_json::json!({}))
        }))
        .into(),
    ]);

    let flat = normalize(&table).unwrap();
    assert_eq!(flat.len(), 2);
    // Equal route specs keep declaration order (stable sort).
    let names: Vec<&str> = flat
        .iter()
        .map(|f| match &f.handler {
            trellis::spec::HandlerRef::Inline(d) => d.name.as_str(),
            trellis::spec::HandlerRef::Catalog { name, .. } => name.as_str(),
        })
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn test_malformed_pattern_is_structural_error() {
    let table = RouteTable::new(vec![route(common::get(), "/w/{", handler()).into()]);
    assert!(matches!(
        normalize(&table),
        Err(CompileError::InvalidPattern { .. })
    ));
}

#[test]
fn test_duplicate_variable_across_nesting_rejected() {
    let table = RouteTable::new(vec![scope(
        "/{id}",
        vec![route(common::get(), "/sub/{id}", handler()).into()],
    )
    .into()]);
    assert!(matches!(
        normalize(&table),
        Err(CompileError::DuplicateVariable { .. })
    ));
}
