//! Shared fixtures: a widgets module catalog and route table used across
//! the integration tests.

#![allow(dead_code)]

use http::Method;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use may::sync::mpsc;
use trellis::catalog::{HandlerDescriptor, ModuleExports, ParamSpec, StaticCatalog};
use trellis::dispatcher::{Dispatcher, HandlerKind, HandlerRequest, HandlerResponse, HeaderVec};
use trellis::ids::RequestId;
use trellis::resolver::ResolverRegistry;
use trellis::router::ParamVec;
use trellis::runtime_config::RuntimeConfig;
use trellis::spec::{route, scope, HandlerRef, MethodKey, RouteTable};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

pub fn get() -> MethodKey {
    MethodKey::Method(Method::GET)
}

pub fn post() -> MethodKey {
    MethodKey::Method(Method::POST)
}

/// Catalog with a `widgets` module exporting the conventional handlers.
pub fn widgets_catalog() -> StaticCatalog {
    let mut module_meta = Map::new();
    module_meta.insert("auth".to_string(), json!("none"));
    module_meta.insert("version".to_string(), json!(1));

    let index = HandlerDescriptor::new(
        "index",
        HandlerKind::sync(|_req, _args| HandlerResponse::json(200, json!({ "handler": "index" }))),
        vec![],
    );
    let show = HandlerDescriptor::new(
        "show",
        HandlerKind::sync(|_req, args| {
            HandlerResponse::json(200, json!({ "handler": "show", "id": args[0] }))
        }),
        vec![ParamSpec::named("id")],
    );
    let create = HandlerDescriptor::new(
        "create",
        HandlerKind::sync(|_req, args| {
            HandlerResponse::json(201, json!({ "handler": "create", "body": args[0] }))
        }),
        vec![ParamSpec::named("body")],
    );
    let destroy = HandlerDescriptor::new(
        "destroy",
        HandlerKind::sync(|_req, args| {
            HandlerResponse::json(200, json!({ "handler": "destroy", "id": args[0] }))
        }),
        vec![ParamSpec::named("id")],
    );

    StaticCatalog::new().module(
        "widgets",
        ModuleExports::new(module_meta)
            .export(index)
            .export(show)
            .export(create)
            .export(destroy),
    )
}

/// The scenario table: `GET /widgets` → index, `GET /widgets/{id}` → show,
/// `POST /widgets` → create.
pub fn widgets_table() -> RouteTable {
    RouteTable::new(vec![scope(
        "/widgets",
        vec![
            route(get(), "", HandlerRef::catalog("widgets", "index")).into(),
            route(get(), "{id}", HandlerRef::catalog("widgets", "show")).into(),
            route(post(), "", HandlerRef::catalog("widgets", "create")).into(),
        ],
    )
    .into()])
}

pub fn compile(table: &RouteTable) -> Dispatcher {
    Dispatcher::compile(
        table,
        &widgets_catalog(),
        &ResolverRegistry::with_defaults(),
        RuntimeConfig::default(),
    )
    .expect("route table should compile")
}

/// A bare augmented request for exercising resolvers and filters directly.
pub fn make_request(method: Method, path: &str) -> HandlerRequest {
    let (reply_tx, _reply_rx) = mpsc::channel();
    HandlerRequest {
        request_id: RequestId::new(),
        method,
        path: path.to_string(),
        endpoint: String::new(),
        headers: HeaderVec::new(),
        params: Map::new(),
        body: None,
        route_params: ParamVec::new(),
        path_context: String::new(),
        reply_tx,
    }
}

/// Inline descriptor around a sync closure, for tables that bypass the
/// catalog.
pub fn inline(
    name: &str,
    params: Vec<ParamSpec>,
    f: impl Fn(&HandlerRequest, &[Value]) -> HandlerResponse + Send + Sync + 'static,
) -> HandlerRef {
    HandlerRef::Inline(HandlerDescriptor::new(name, HandlerKind::sync(f), params))
}

/// Filter matching a literal header value.
pub fn header_filter(name: &'static str, value: &'static str) -> trellis::dispatcher::RequestFilter {
    Arc::new(move |req: &HandlerRequest| req.get_header(name) == Some(value))
}
