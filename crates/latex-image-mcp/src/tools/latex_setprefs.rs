//! Tool: latex_setprefs. Set dark mode and font size.

use serde::Deserialize;
use serde_json::{json, Value};

use latex_image::{Elicitor, FontSize};

use crate::session::LatexSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "latex_setprefs";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetPrefsParams {
    #[serde(default)]
    dark_mode: Option<bool>,
    #[serde(default)]
    font_size: Option<String>,
}

/// Shape of the preferences object returned by both preference tools.
pub fn preferences_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "darkMode": { "type": ["boolean", "null"] },
            "fontSize": { "type": ["string", "null"], "enum": font_size_enum_with_null() }
        },
        "required": ["darkMode", "fontSize"]
    })
}

fn font_size_enum_with_null() -> Vec<Value> {
    FontSize::idents()
        .into_iter()
        .map(Value::from)
        .chain(std::iter::once(Value::Null))
        .collect()
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        title: Some("Set LaTeX Preferences".to_string()),
        description: Some(
            "Sets the LaTeX rendering preferences for dark mode and font size.".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "darkMode": {
                    "type": "boolean",
                    "description": "Use dark mode by inverting the colors in the output."
                },
                "fontSize": {
                    "type": "string",
                    "description": "Font size to use in the output: tiny=5pt, small=9pt, large=12pt, LARGE=18pt, huge=20pt",
                    "enum": FontSize::idents(),
                    "enumNames": FontSize::labels()
                }
            }
        }),
        output_schema: Some(preferences_schema()),
    }
}

pub async fn execute(
    args: Value,
    session: &LatexSession,
    client: &dyn Elicitor,
) -> McpResult<ToolCallResult> {
    let params: SetPrefsParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match session
        .set_preferences(client, params.dark_mode, params.font_size)
        .await
    {
        Ok(preferences) => Ok(ToolCallResult::json(&preferences)),
        Err(e) => {
            tracing::warn!("Failed to set preferences: {e}");
            Ok(ToolCallResult::error(e.to_string()))
        }
    }
}
