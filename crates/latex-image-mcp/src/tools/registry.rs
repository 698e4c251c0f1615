//! Tool registration and dispatch.

use serde_json::Value;

use latex_image::Elicitor;

use crate::protocol::validator::tool_arguments;
use crate::session::LatexSession;
use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{latex_getprefs, latex_render, latex_setprefs};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            latex_render::definition(),
            latex_getprefs::definition(),
            latex_setprefs::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        session: &LatexSession,
        client: &dyn Elicitor,
    ) -> McpResult<ToolCallResult> {
        let args = tool_arguments(arguments)?;

        match name {
            latex_render::NAME => latex_render::execute(args, session, client).await,
            latex_getprefs::NAME => latex_getprefs::execute(args, session).await,
            latex_setprefs::NAME => latex_setprefs::execute(args, session, client).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
