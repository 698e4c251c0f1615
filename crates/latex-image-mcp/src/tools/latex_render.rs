//! Tool: latex. Render a LaTeX equation as an inline markdown image.

use serde::Deserialize;
use serde_json::{json, Value};

use latex_image::Elicitor;

use crate::session::LatexSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

pub const NAME: &str = "latex";

#[derive(Debug, Deserialize)]
struct RenderParams {
    latex: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_string(),
        title: Some("LaTeX to Image".to_string()),
        description: Some(
            "Converts LaTeX equations into markdown-formatted images for inline display."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "latex": {
                    "type": "string",
                    "description": "The LaTeX equation to render."
                }
            },
            "required": ["latex"]
        }),
        output_schema: None,
    }
}

/// Text returned when rendering fails: the formula, then the reason.
pub fn failure_text(formula: &str, reason: &str) -> String {
    format!("```latex\n{formula}\n```\n> {reason}")
}

pub async fn execute(
    args: Value,
    session: &LatexSession,
    client: &dyn Elicitor,
) -> McpResult<ToolCallResult> {
    let params: RenderParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    match session.render(&params.latex, client).await {
        Ok(image) => Ok(ToolCallResult::text(image.to_markdown())),
        Err(e) if e.is_render_failure() => {
            tracing::warn!("Render failed for {:?}: {e}", params.latex);
            Ok(ToolCallResult::error(failure_text(&params.latex, &e.to_string())))
        }
        Err(e) => Err(e.into()),
    }
}
