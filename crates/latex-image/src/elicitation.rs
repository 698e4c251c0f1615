//! Elicitation request/response shapes and the client-facing trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::preferences::{DARK_MODE_KEY, FONT_SIZE_KEY};
use crate::types::{DarkMode, FontSize, LatexError, LatexResult};

pub const PREFERENCES_MESSAGE: &str = "Specify LaTeX rendering preferences";

/// Parameters of an `elicitation/create` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitationRequest {
    pub message: String,
    pub requested_schema: RequestedSchema,
}

/// Flat object schema restricted to primitive properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElicitationAction {
    Accept,
    Decline,
    Cancel,
}

/// Client answer to an elicitation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElicitationResponse {
    pub action: ElicitationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, Value>>,
}

impl ElicitationResponse {
    pub fn accept(content: Map<String, Value>) -> Self {
        Self {
            action: ElicitationAction::Accept,
            content: Some(content),
        }
    }

    pub fn decline() -> Self {
        Self {
            action: ElicitationAction::Decline,
            content: None,
        }
    }
}

/// The calling client, as seen by the preference resolver.
#[async_trait]
pub trait Elicitor: Send + Sync {
    /// Whether the client declared the elicitation capability.
    async fn supports_elicitation(&self) -> bool;

    /// Send one elicitation request and wait for the client's answer.
    async fn elicit(&self, request: ElicitationRequest) -> LatexResult<ElicitationResponse>;
}

/// A client that never supports elicitation (CLI, non-interactive callers).
pub struct NoElicitation;

#[async_trait]
impl Elicitor for NoElicitation {
    async fn supports_elicitation(&self) -> bool {
        false
    }

    async fn elicit(&self, _request: ElicitationRequest) -> LatexResult<ElicitationResponse> {
        Err(LatexError::Elicitation(
            "client does not support elicitation".to_string(),
        ))
    }
}

/// Build the preferences form. `darkMode` defaults to the current value when known.
pub fn preferences_request(current: DarkMode) -> ElicitationRequest {
    let mut dark_mode = serde_json::json!({
        "type": "boolean",
        "title": "Dark Mode",
        "description": "Use dark mode?",
    });
    if let Some(default) = current.as_option() {
        dark_mode["default"] = Value::Bool(default);
    }

    let font_size = serde_json::json!({
        "type": "string",
        "title": "Font Size",
        "description": "Font size to use for the LaTeX rendering.",
        "enum": FontSize::idents(),
        "enumNames": FontSize::labels(),
    });

    let mut properties = Map::new();
    properties.insert(DARK_MODE_KEY.to_string(), dark_mode);
    properties.insert(FONT_SIZE_KEY.to_string(), font_size);

    ElicitationRequest {
        message: PREFERENCES_MESSAGE.to_string(),
        requested_schema: RequestedSchema {
            schema_type: "object".to_string(),
            properties,
            required: vec![DARK_MODE_KEY.to_string(), FONT_SIZE_KEY.to_string()],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_schema_shape() {
        let request = preferences_request(DarkMode::Off);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["message"], PREFERENCES_MESSAGE);
        assert_eq!(json["requestedSchema"]["type"], "object");
        assert_eq!(json["requestedSchema"]["required"], serde_json::json!(["darkMode", "fontSize"]));
        assert_eq!(json["requestedSchema"]["properties"]["darkMode"]["default"], false);
        assert_eq!(
            json["requestedSchema"]["properties"]["fontSize"]["enum"],
            serde_json::json!(["tiny", "small", "large", "LARGE", "huge"])
        );
        assert_eq!(
            json["requestedSchema"]["properties"]["fontSize"]["enumNames"][3],
            "LARGE"
        );
    }

    #[test]
    fn test_request_without_known_dark_mode_has_no_default() {
        let request = preferences_request(DarkMode::Unset);
        let dark = &request.requested_schema.properties["darkMode"];
        assert!(dark.get("default").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let accept: ElicitationResponse = serde_json::from_value(serde_json::json!({
            "action": "accept",
            "content": { "darkMode": true, "fontSize": "huge" }
        }))
        .unwrap();
        assert_eq!(accept.action, ElicitationAction::Accept);
        assert_eq!(accept.content.unwrap()["fontSize"], "huge");

        let cancel: ElicitationResponse =
            serde_json::from_value(serde_json::json!({ "action": "cancel" })).unwrap();
        assert_eq!(cancel.action, ElicitationAction::Cancel);
        assert!(cancel.content.is_none());
    }
}
