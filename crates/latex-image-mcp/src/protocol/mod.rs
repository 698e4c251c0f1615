//! MCP protocol handling: JSON-RPC dispatch and the client peer.

pub mod handler;
pub mod negotiation;
pub mod peer;
pub mod validator;

pub use handler::ProtocolHandler;
pub use peer::ClientPeer;
