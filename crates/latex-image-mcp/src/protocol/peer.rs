//! The connected client: outgoing server→client requests and elicitation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, Mutex};

use latex_image::{ElicitationRequest, ElicitationResponse, Elicitor, LatexError, LatexResult};

use crate::types::{JsonRpcRequest, McpError, McpResult, RequestId};

use super::negotiation::NegotiatedCapabilities;

type Pending = HashMap<RequestId, oneshot::Sender<McpResult<Value>>>;

/// Sends messages to the client and correlates its responses.
pub struct ClientPeer {
    outgoing: mpsc::UnboundedSender<Value>,
    pending: Mutex<Pending>,
    next_id: AtomicI64,
    capabilities: Arc<Mutex<NegotiatedCapabilities>>,
}

impl ClientPeer {
    pub fn new(
        outgoing: mpsc::UnboundedSender<Value>,
        capabilities: Arc<Mutex<NegotiatedCapabilities>>,
    ) -> Self {
        Self {
            outgoing,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            capabilities,
        }
    }

    /// Queue a message for the writer.
    pub fn send(&self, message: Value) -> McpResult<()> {
        self.outgoing
            .send(message)
            .map_err(|_| McpError::Transport("Output channel closed".to_string()))
    }

    /// Send a request to the client and wait for its response.
    pub async fn request(&self, method: &str, params: Value) -> McpResult<Value> {
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let request = JsonRpcRequest::new(id.clone(), method, Some(params));
        let sent = serde_json::to_value(&request)
            .map_err(McpError::Json)
            .and_then(|value| self.send(value));
        if let Err(e) = sent {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        tracing::debug!("Sent {method} request {id} to client");

        rx.await.map_err(|_| {
            McpError::Transport(format!("Connection closed before response to {method}"))
        })?
    }

    /// Route a client response to the waiting request. Returns false when no
    /// request with that id is pending.
    pub async fn complete(&self, id: &RequestId, result: McpResult<Value>) -> bool {
        let Some(tx) = self.pending.lock().await.remove(id) else {
            tracing::warn!("Response for unknown request id {id}");
            return false;
        };
        // The requester may have been cancelled meanwhile.
        let _ = tx.send(result);
        true
    }

    /// Fail every pending request, e.g. when the input stream ends.
    pub async fn fail_pending(&self) {
        let mut pending = self.pending.lock().await;
        if !pending.is_empty() {
            tracing::info!("Dropping {} pending client request(s)", pending.len());
        }
        for (_, tx) in pending.drain() {
            let _ = tx.send(Err(McpError::Transport("Connection closed".to_string())));
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[async_trait]
impl Elicitor for ClientPeer {
    async fn supports_elicitation(&self) -> bool {
        self.capabilities.lock().await.client.supports_elicitation()
    }

    async fn elicit(&self, request: ElicitationRequest) -> LatexResult<ElicitationResponse> {
        let params = serde_json::to_value(&request)?;
        let result = self
            .request("elicitation/create", params)
            .await
            .map_err(|e| LatexError::Elicitation(e.to_string()))?;
        serde_json::from_value(result)
            .map_err(|e| LatexError::Elicitation(format!("Malformed elicitation result: {e}")))
    }
}
