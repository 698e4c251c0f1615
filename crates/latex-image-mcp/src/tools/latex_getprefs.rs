//! Tool: latex_getprefs. Read the current rendering preferences.

use serde_json::{json, Value};

use crate::session::LatexSession;
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "latex_getprefs";

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        title: Some("Get LaTeX Preferences".to_string()),
        description: Some(
            "Gets the saved LaTeX rendering preferences for dark mode and font size.".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
        output_schema: Some(super::latex_setprefs::preferences_schema()),
    }
}

pub async fn execute(_args: Value, session: &LatexSession) -> McpResult<ToolCallResult> {
    let preferences = session.preferences().await;
    Ok(ToolCallResult::json(&preferences))
}
