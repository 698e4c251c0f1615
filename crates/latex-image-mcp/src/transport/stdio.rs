//! Stdio transport: reads JSON-RPC from stdin, writes to stdout.
//!
//! Reading and writing are decoupled: every outgoing message goes through one
//! channel drained by a writer task, and requests run on their own tasks, so a
//! tool call waiting on the client never blocks the reader.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::protocol::ProtocolHandler;
use crate::session::LatexSession;
use crate::types::{McpError, McpResult};

use super::framing;

/// Stdio transport for desktop MCP clients.
pub struct StdioTransport {
    session: Arc<LatexSession>,
}

impl StdioTransport {
    pub fn new(session: Arc<LatexSession>) -> Self {
        Self { session }
    }

    /// Run the transport loop until stdin closes.
    pub async fn run(&self) -> McpResult<()> {
        let (tx, rx) = mpsc::unbounded_channel::<Value>();
        let handler = Arc::new(ProtocolHandler::new(self.session.clone(), tx));
        let writer = tokio::spawn(write_loop(rx));

        let mut reader = BufReader::new(tokio::io::stdin());
        let mut line = String::new();

        tracing::info!("Stdio transport started");

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await.map_err(McpError::Io)?;

            if bytes_read == 0 {
                tracing::info!("EOF on stdin, shutting down");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match framing::parse_message(trimmed) {
                Ok(msg) => handler.dispatch(msg).await,
                Err(e) => {
                    tracing::warn!("Parse error: {e}");
                    let value = serde_json::to_value(framing::parse_error_response(&e))
                        .map_err(|e| McpError::InternalError(e.to_string()))?;
                    handler.peer().send(value)?;
                }
            }
        }

        // Nobody is left to read responses or answer elicitations.
        handler.shutdown().await;
        drop(handler);

        writer
            .await
            .map_err(|e| McpError::Transport(format!("Writer task failed: {e}")))?
    }
}

async fn write_loop(mut rx: mpsc::UnboundedReceiver<Value>) -> McpResult<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(message) = rx.recv().await {
        let framed = framing::frame_message(&message)?;
        stdout
            .write_all(framed.as_bytes())
            .await
            .map_err(McpError::Io)?;
        stdout.flush().await.map_err(McpError::Io)?;
    }
    Ok(())
}
