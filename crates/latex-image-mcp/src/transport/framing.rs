//! Message framing for newline-delimited JSON.

use serde::Serialize;

use crate::types::{JsonRpcError, JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse a single line of text as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a message to a single JSON line (with trailing newline).
/// Embedded newlines are escaped by the serializer, so one value is one line.
pub fn frame_message(value: &impl Serialize) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Error reply for a line that could not be parsed. The id is unknown, so null.
pub fn parse_error_response(error: &McpError) -> JsonRpcError {
    error.to_json_rpc_error(RequestId::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_one_line() {
        let framed = frame_message(&serde_json::json!({ "text": "a\nb" })).unwrap();
        assert_eq!(framed.matches('\n').count(), 1);
        assert!(framed.ends_with('\n'));
    }

    #[test]
    fn test_parse_error_response_has_null_id() {
        let err = parse_message("{\"broken\":").unwrap_err();
        let value = serde_json::to_value(parse_error_response(&err)).unwrap();
        assert_eq!(value["id"], serde_json::Value::Null);
        assert_eq!(value["error"]["code"], -32700);
    }
}
