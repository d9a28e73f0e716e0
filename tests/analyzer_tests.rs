//! Tests for the table analyzer: catalog resolution, metadata merging,
//! arity handling, and parameter classification.

use serde_json::{json, Map};

use trellis::analyzer::analyze;
use trellis::catalog::{HandlerDescriptor, ModuleExports, ParamSpec, StaticCatalog};
use trellis::dispatcher::{HandlerKind, HandlerResponse};
use trellis::error::CompileError;
use trellis::resolver::ResolverRegistry;
use trellis::spec::{normalize, route, HandlerRef, RouteTable};

mod common;

fn ok_handler() -> HandlerKind {
    HandlerKind::sync(|_req, _args| HandlerResponse::json(200, json!({})))
}

fn analyze_table(
    table: &RouteTable,
    catalog: &StaticCatalog,
) -> Result<Vec<trellis::analyzer::AnalyzedHandler>, CompileError> {
    let flat = normalize(table).unwrap();
    analyze(flat, catalog, &ResolverRegistry::with_defaults())
}

#[test]
fn test_module_metadata_merged_under_handler_metadata() {
    let analyzed = analyze_table(&common::widgets_table(), &common::widgets_catalog()).unwrap();
    let index = analyzed
        .iter()
        .find(|a| a.handler_name == "index")
        .unwrap();
    // Module-level defaults flow through untouched.
    assert_eq!(index.metadata.get("auth"), Some(&json!("none")));
    assert_eq!(index.metadata.get("version"), Some(&json!(1)));
}

#[test]
fn test_handler_metadata_wins_shallow() {
    let mut module_meta = Map::new();
    module_meta.insert("auth".to_string(), json!("none"));
    module_meta.insert(
        "limits".to_string(),
        json!({ "rate": 10, "burst": 5 }),
    );

    let mut handler_meta = Map::new();
    handler_meta.insert("auth".to_string(), json!("token"));
    handler_meta.insert("limits".to_string(), json!({ "rate": 99 }));

    let catalog = StaticCatalog::new().module(
        "m",
        ModuleExports::new(module_meta).export(
            HandlerDescriptor::new("h", ok_handler(), vec![]).with_metadata(handler_meta),
        ),
    );
    let table = RouteTable::new(vec![route(common::get(), "/x", HandlerRef::catalog("m", "h")).into()]);

    let analyzed = analyze_table(&table, &catalog).unwrap();
    assert_eq!(analyzed[0].metadata.get("auth"), Some(&json!("token")));
    // Shallow merge: the nested map is replaced wholesale, not deep-merged.
    assert_eq!(
        analyzed[0].metadata.get("limits"),
        Some(&json!({ "rate": 99 }))
    );
}

#[test]
fn test_only_first_arity_honored() {
    let catalog = StaticCatalog::new().module(
        "m",
        ModuleExports::default().export(
            HandlerDescriptor::new("h", ok_handler(), vec![ParamSpec::named("body")])
                .with_arity(vec![ParamSpec::named("body"), ParamSpec::named("params")]),
        ),
    );
    let table = RouteTable::new(vec![route(common::get(), "/x", HandlerRef::catalog("m", "h")).into()]);

    let analyzed = analyze_table(&table, &catalog).unwrap();
    assert_eq!(analyzed[0].params.len(), 1);
    assert_eq!(analyzed[0].params[0].identifier(), Some("body"));
}

#[test]
fn test_missing_module_fails_fast_naming_route() {
    let table = RouteTable::new(vec![route(
        common::get(),
        "/ghost",
        HandlerRef::catalog("nope", "h"),
    )
    .into()]);

    let err = analyze_table(&table, &StaticCatalog::new()).unwrap_err();
    match err {
        CompileError::ModuleLoad { module, route, .. } => {
            assert_eq!(module, "nope");
            assert_eq!(route, "GET /ghost");
        }
        other => panic!("expected ModuleLoad, got {other}"),
    }
}

#[test]
fn test_missing_handler_in_loaded_module() {
    let catalog = StaticCatalog::new().module("m", ModuleExports::default());
    let table = RouteTable::new(vec![route(common::get(), "/x", HandlerRef::catalog("m", "gone")).into()]);

    let err = analyze_table(&table, &catalog).unwrap_err();
    assert!(matches!(
        err,
        CompileError::HandlerNotFound { ref name, .. } if name == "gone"
    ));
}

#[test]
fn test_route_and_free_param_classification() {
    let catalog = StaticCatalog::new().module(
        "m",
        ModuleExports::default().export(HandlerDescriptor::new(
            "h",
            ok_handler(),
            vec![ParamSpec::named("id"), ParamSpec::named("body")],
        )),
    );
    let table = RouteTable::new(vec![route(
        common::get(),
        "/w/{id}",
        HandlerRef::catalog("m", "h"),
    )
    .into()]);

    let analyzed = analyze_table(&table, &catalog).unwrap();
    assert_eq!(analyzed[0].route_params, vec!["id".to_string()]);
    let free: Vec<&str> = analyzed[0]
        .free_params()
        .iter()
        .filter_map(|p| p.identifier())
        .collect();
    assert_eq!(free, vec!["body"]);
}

#[test]
fn test_endpoint_names_full_path() {
    let analyzed = analyze_table(&common::widgets_table(), &common::widgets_catalog()).unwrap();
    let endpoints: Vec<&str> = analyzed.iter().map(|a| a.endpoint.as_str()).collect();
    assert_eq!(
        endpoints,
        vec!["GET /widgets", "POST /widgets", "GET /widgets/{id}"]
    );
}
