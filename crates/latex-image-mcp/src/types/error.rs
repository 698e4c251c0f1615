//! Error types and JSON-RPC error codes for the MCP server.

use latex_image::LatexError;

use super::message::{JsonRpcError, JsonRpcErrorObject, RequestId, JSONRPC_VERSION};

/// Standard JSON-RPC 2.0 error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

/// MCP-specific error codes.
pub mod mcp_error_codes {
    pub const TOOL_NOT_FOUND: i32 = -32803;
    pub const PREFERENCES_ERROR: i32 = -32851;
}

/// All errors that can occur in the MCP server.
#[derive(thiserror::Error, Debug)]
pub enum McpError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Preferences error: {0}")]
    Preferences(String),

    /// Error object returned by the client for a server-initiated request.
    #[error("Client error {code}: {message}")]
    ClientError { code: i32, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    pub fn code(&self) -> i32 {
        use error_codes::*;
        use mcp_error_codes::*;
        match self {
            McpError::ParseError(_) => PARSE_ERROR,
            McpError::InvalidRequest(_) => INVALID_REQUEST,
            McpError::MethodNotFound(_) => METHOD_NOT_FOUND,
            McpError::InvalidParams(_) => INVALID_PARAMS,
            McpError::InternalError(_) => INTERNAL_ERROR,
            McpError::ToolNotFound(_) => TOOL_NOT_FOUND,
            McpError::Preferences(_) => PREFERENCES_ERROR,
            McpError::ClientError { code, .. } => *code,
            McpError::Transport(_) | McpError::Io(_) => INTERNAL_ERROR,
            McpError::Json(_) => PARSE_ERROR,
        }
    }

    pub fn to_json_rpc_error(&self, id: RequestId) -> JsonRpcError {
        JsonRpcError {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            error: JsonRpcErrorObject {
                code: self.code(),
                message: self.to_string(),
                data: None,
            },
        }
    }
}

/// Render failures never get here: the `latex` tool turns them into error
/// results. What remains comes from opening or writing the preferences.
impl From<LatexError> for McpError {
    fn from(e: LatexError) -> Self {
        match e {
            LatexError::Io(e) => McpError::Io(e),
            LatexError::Json(e) => McpError::Json(e),
            e @ (LatexError::Persistence(_) | LatexError::Elicitation(_)) => {
                McpError::Preferences(e.to_string())
            }
            e => McpError::InternalError(e.to_string()),
        }
    }
}

pub type McpResult<T> = Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latex_error_mapping() {
        let io: McpError =
            LatexError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).into();
        assert!(matches!(io, McpError::Io(_)));
        assert_eq!(io.to_string(), "IO error: gone");

        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let json: McpError = LatexError::Json(bad_json).into();
        assert!(matches!(json, McpError::Json(_)));

        let persist: McpError = LatexError::Persistence("disk full".to_string()).into();
        assert_eq!(persist.code(), mcp_error_codes::PREFERENCES_ERROR);
        assert!(persist.to_string().contains("disk full"));

        let status: McpError = LatexError::Status {
            code: 503,
            reason: "Service Unavailable".to_string(),
        }
        .into();
        assert_eq!(status.code(), error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_json_rpc_error_shape() {
        let err = McpError::ToolNotFound("nope".to_string());
        let value = serde_json::to_value(err.to_json_rpc_error(RequestId::Number(4))).unwrap();
        assert_eq!(value["id"], 4);
        assert_eq!(value["error"]["code"], -32803);
        assert_eq!(value["error"]["message"], "Tool not found: nope");
    }
}
