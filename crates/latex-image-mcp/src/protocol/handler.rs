//! Request dispatcher: routes incoming JSON-RPC messages to handlers.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio::task::AbortHandle;

use crate::session::LatexSession;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::NegotiatedCapabilities;
use super::peer::ClientPeer;
use super::validator::validate_request;

/// The main protocol handler that dispatches incoming JSON-RPC messages.
pub struct ProtocolHandler {
    session: Arc<LatexSession>,
    capabilities: Arc<Mutex<NegotiatedCapabilities>>,
    peer: Arc<ClientPeer>,
    in_flight: Mutex<HashMap<RequestId, AbortHandle>>,
}

impl ProtocolHandler {
    /// `outgoing` receives every message the server sends on its own:
    /// requests to the client, and responses of spawned requests.
    pub fn new(session: Arc<LatexSession>, outgoing: mpsc::UnboundedSender<Value>) -> Self {
        let capabilities = Arc::new(Mutex::new(NegotiatedCapabilities::default()));
        let peer = Arc::new(ClientPeer::new(outgoing, capabilities.clone()));
        Self {
            session,
            capabilities,
            peer,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn peer(&self) -> &Arc<ClientPeer> {
        &self.peer
    }

    /// Handle one message inline and return the response, if any.
    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            JsonRpcMessage::Response(resp) => {
                self.peer.complete(&resp.id, Ok(resp.result)).await;
                None
            }
            JsonRpcMessage::Error(err) => {
                let error = McpError::ClientError {
                    code: err.error.code,
                    message: err.error.message,
                };
                self.peer.complete(&err.id, Err(error)).await;
                None
            }
        }
    }

    /// Handle one message without blocking the reader. Requests run on their
    /// own task and answer through the outgoing channel; they can be aborted
    /// by `notifications/cancelled`.
    pub async fn dispatch(self: &Arc<Self>, msg: JsonRpcMessage) {
        let request = match msg {
            JsonRpcMessage::Request(request) => request,
            other => {
                if let Some(response) = self.handle_message(other).await {
                    self.send_or_log(response);
                }
                return;
            }
        };

        let id = request.id.clone();
        let mut in_flight = self.in_flight.lock().await;

        let this = Arc::clone(self);
        let task_id = id.clone();
        let handle = tokio::spawn(async move {
            let response = this.handle_request(request).await;
            this.in_flight.lock().await.remove(&task_id);
            this.send_or_log(response);
        });

        in_flight.insert(id, handle.abort_handle());
    }

    /// Fail pending client requests and abort running ones.
    pub async fn shutdown(&self) {
        self.peer.fail_pending().await;
        let mut in_flight = self.in_flight.lock().await;
        for (id, handle) in in_flight.drain() {
            tracing::debug!("Aborting request {id}");
            handle.abort();
        }
    }

    fn send_or_log(&self, message: Value) {
        if let Err(e) = self.peer.send(message) {
            tracing::warn!("Dropping outgoing message: {e}");
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return encode_reply(&request.id, &e.to_json_rpc_error(request.id.clone()));
        }

        let id = request.id.clone();
        let result = self.dispatch_request(&request).await;

        match result {
            Ok(value) => encode_reply(&id, &JsonRpcResponse::new(id.clone(), value)),
            Err(e) => encode_reply(&id, &e.to_json_rpc_error(id.clone())),
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "shutdown" => self.handle_shutdown().await,

            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request.params.clone()).await,

            "ping" => Ok(Value::Object(serde_json::Map::new())),

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" | "notifications/initialized" => {
                self.capabilities.lock().await.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                self.handle_cancel(notification.params).await;
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_cancel(&self, params: Option<Value>) {
        let Some(params) = params
            .and_then(|p| serde_json::from_value::<CancelRequestParams>(p).ok())
        else {
            tracing::warn!("Cancellation without a valid requestId");
            return;
        };

        let Ok(id) = serde_json::from_value::<RequestId>(params.request_id) else {
            tracing::warn!("Cancellation with malformed requestId");
            return;
        };

        match self.in_flight.lock().await.remove(&id) {
            Some(handle) => {
                handle.abort();
                tracing::info!(
                    "Cancelled request {id}: {}",
                    params.reason.as_deref().unwrap_or("no reason given")
                );
            }
            None => tracing::debug!("Cancellation for finished or unknown request {id}"),
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Initialize params required".to_string()))?;

        let result = self.capabilities.lock().await.negotiate(init_params);

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_shutdown(&self) -> McpResult<Value> {
        tracing::info!("Shutdown requested");
        self.peer.fail_pending().await;
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        let result = ToolListResult {
            tools: ToolRegistry::list_tools(),
            next_cursor: None,
        };
        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call_params: ToolCallParams = params
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| McpError::InvalidParams(e.to_string()))?
            .ok_or_else(|| McpError::InvalidParams("Tool call params required".to_string()))?;

        tracing::debug!("Tool call: {}", call_params.name);

        let result = ToolRegistry::call(
            &call_params.name,
            call_params.arguments,
            &self.session,
            self.peer.as_ref(),
        )
        .await?;

        serde_json::to_value(result).map_err(|e| McpError::InternalError(e.to_string()))
    }
}

/// Serialize a reply for request `id`. If that fails, the client still gets
/// an internal error for the same id.
fn encode_reply(id: &RequestId, reply: &impl Serialize) -> Value {
    match serde_json::to_value(reply) {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to serialize reply to request {id}: {e}");
            let mut error = serde_json::Map::new();
            error.insert("code".into(), Value::from(error_codes::INTERNAL_ERROR));
            error.insert(
                "message".into(),
                Value::String(format!("Internal error: failed to serialize reply: {e}")),
            );

            let mut reply = serde_json::Map::new();
            reply.insert("jsonrpc".into(), Value::from(JSONRPC_VERSION));
            reply.insert("id".into(), id.to_value());
            reply.insert("error".into(), Value::Object(error));
            Value::Object(reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[test]
    fn test_encode_reply_passes_through() {
        let id = RequestId::Number(3);
        let value = encode_reply(&id, &JsonRpcResponse::new(id.clone(), Value::Bool(true)));
        assert_eq!(value["id"], 3);
        assert_eq!(value["result"], true);
    }

    #[test]
    fn test_encode_reply_failure_becomes_internal_error() {
        let value = encode_reply(&RequestId::String("abc".to_string()), &Unserializable);
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["id"], "abc");
        assert_eq!(value["error"]["code"], -32603);
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("not representable"));
        assert!(value.get("result").is_none());
    }
}
