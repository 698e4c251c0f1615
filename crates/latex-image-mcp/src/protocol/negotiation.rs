//! MCP capability negotiation during initialization.

use crate::types::{ClientCapabilities, Implementation, InitializeParams, InitializeResult, MCP_VERSION};

/// Protocol revisions this server can speak, newest first.
pub const SUPPORTED_VERSIONS: &[&str] = &[MCP_VERSION, "2025-03-26", "2024-11-05"];

/// Stored client capabilities after negotiation.
#[derive(Debug, Clone, Default)]
pub struct NegotiatedCapabilities {
    pub client: ClientCapabilities,
    pub client_info: Option<Implementation>,
    pub protocol_version: Option<String>,
    pub initialized: bool,
}

impl NegotiatedCapabilities {
    pub fn negotiate(&mut self, params: InitializeParams) -> InitializeResult {
        let version = if SUPPORTED_VERSIONS.contains(&params.protocol_version.as_str()) {
            params.protocol_version.clone()
        } else {
            tracing::warn!(
                "Client requested protocol version {}, server supports {}. Proceeding with server version.",
                params.protocol_version,
                MCP_VERSION
            );
            MCP_VERSION.to_string()
        };

        tracing::info!(
            "Initialized with client: {} v{} (elicitation: {})",
            params.client_info.name,
            params.client_info.version,
            params.capabilities.supports_elicitation()
        );

        self.client = params.capabilities;
        self.client_info = Some(params.client_info);
        self.protocol_version = Some(version.clone());

        InitializeResult::with_version(&version)
    }

    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        tracing::info!("MCP handshake complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(version: &str, capabilities: serde_json::Value) -> InitializeParams {
        serde_json::from_value(serde_json::json!({
            "protocolVersion": version,
            "capabilities": capabilities,
            "clientInfo": { "name": "test", "version": "1.0" }
        }))
        .unwrap()
    }

    #[test]
    fn test_negotiate_records_elicitation() {
        let mut caps = NegotiatedCapabilities::default();
        let result = caps.negotiate(params(MCP_VERSION, serde_json::json!({ "elicitation": {} })));
        assert_eq!(result.protocol_version, MCP_VERSION);
        assert!(caps.client.supports_elicitation());
    }

    #[test]
    fn test_negotiate_older_and_unknown_versions() {
        let mut caps = NegotiatedCapabilities::default();
        let result = caps.negotiate(params("2024-11-05", serde_json::json!({})));
        assert_eq!(result.protocol_version, "2024-11-05");
        assert!(!caps.client.supports_elicitation());

        let result = caps.negotiate(params("1999-01-01", serde_json::json!({})));
        assert_eq!(result.protocol_version, MCP_VERSION);
    }
}
