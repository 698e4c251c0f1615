//! JSON-RPC request validation.

use serde_json::Value;

use crate::types::{JsonRpcRequest, McpError, McpResult, RequestId, JSONRPC_VERSION};

/// Validate that a JSON-RPC request is well-formed.
pub fn validate_request(request: &JsonRpcRequest) -> McpResult<()> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(McpError::InvalidRequest(format!(
            "Expected jsonrpc version \"{JSONRPC_VERSION}\", got \"{}\"",
            request.jsonrpc
        )));
    }

    if request.method.is_empty() {
        return Err(McpError::InvalidRequest(
            "Method name must not be empty".to_string(),
        ));
    }

    if request.id == RequestId::Null {
        return Err(McpError::InvalidRequest(
            "Request id must not be null".to_string(),
        ));
    }

    Ok(())
}

/// Tool arguments must be a JSON object; a missing value counts as empty.
pub fn tool_arguments(arguments: Option<Value>) -> McpResult<Value> {
    match arguments {
        None | Some(Value::Null) => Ok(Value::Object(serde_json::Map::new())),
        Some(Value::Object(map)) => Ok(Value::Object(map)),
        Some(other) => Err(McpError::InvalidParams(format!(
            "Tool arguments must be an object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_version_and_empty_method() {
        let mut req = JsonRpcRequest::new(RequestId::Number(1), "ping", None);
        assert!(validate_request(&req).is_ok());

        req.jsonrpc = "1.0".to_string();
        assert!(validate_request(&req).is_err());

        let empty = JsonRpcRequest::new(RequestId::Number(1), "", None);
        assert!(validate_request(&empty).is_err());

        let null_id = JsonRpcRequest::new(RequestId::Null, "ping", None);
        assert!(validate_request(&null_id).is_err());
    }

    #[test]
    fn test_tool_arguments() {
        assert_eq!(tool_arguments(None).unwrap(), serde_json::json!({}));
        assert!(tool_arguments(Some(serde_json::json!([1, 2]))).is_err());
    }
}
