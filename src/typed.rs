//! Type-safe handler adapters.
//!
//! A typed handler converts the augmented request into its own request
//! type via `TryFrom` and returns a `Serialize` response. Conversion
//! failures become 400 responses; successful results are serialized into a
//! 200 JSON response. Typed handlers declare no resolver-driven
//! parameters - they work off the request itself.

use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::convert::TryFrom;

use crate::dispatcher::{HandlerKind, HandlerRequest, HandlerResponse};
use crate::router::ParamVec;

/// Trait implemented by typed handlers.
pub trait TypedHandler: Send + Sync + 'static {
    /// The typed request, converted from [`HandlerRequest`].
    type Request: TryFrom<HandlerRequest, Error = anyhow::Error> + Send + 'static;
    /// The typed response, serialized to JSON.
    type Response: Serialize + Send + 'static;

    fn handle(&self, req: TypedHandlerRequest<Self::Request>) -> Self::Response;
}

/// Request metadata plus the converted, strongly typed request data.
#[derive(Debug, Clone)]
pub struct TypedHandlerRequest<T> {
    pub method: Method,
    pub path: String,
    pub endpoint: String,
    pub route_params: ParamVec,
    pub path_context: String,
    pub data: T,
}

/// Adapt a typed handler into a catalog-registrable handler kind.
#[must_use]
pub fn typed<H: TypedHandler>(handler: H) -> HandlerKind {
    HandlerKind::sync(move |req: &HandlerRequest, _args: &[Value]| {
        let data = match H::Request::try_from(req.clone()) {
            Ok(data) => data,
            Err(err) => {
                return HandlerResponse::json(
                    400,
                    serde_json::json!({
                        "error": "Invalid request data",
                        "message": err.to_string(),
                    }),
                )
            }
        };

        let typed_req = TypedHandlerRequest {
            method: req.method.clone(),
            path: req.path.clone(),
            endpoint: req.endpoint.clone(),
            route_params: req.route_params.clone(),
            path_context: req.path_context.clone(),
            data,
        };

        match serde_json::to_value(handler.handle(typed_req)) {
            Ok(body) => HandlerResponse::json(200, body),
            Err(_) => HandlerResponse::error(500, "failed to serialize response"),
        }
    })
}
