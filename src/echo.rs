use serde_json::Value;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

// Diagnostic handler: mirrors the augmented request back as JSON.
pub fn echo_handler(req: &HandlerRequest, args: &[Value]) -> HandlerResponse {
    HandlerResponse::json(
        200,
        serde_json::json!({
            "endpoint": req.endpoint,
            "method": req.method.to_string(),
            "path": req.path,
            "path_context": req.path_context,
            "route_params": req.route_params_map(),
            "params": req.params,
            "body": req.body,
            "args": args,
        }),
    )
}
