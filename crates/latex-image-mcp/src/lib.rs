//! latex-image MCP server. Renders LaTeX formulas to inline markdown images
//! and negotiates rendering preferences with the client.

pub mod config;
pub mod protocol;
pub mod session;
pub mod tools;
pub mod transport;
pub mod types;

pub use config::ServerConfig;
pub use protocol::ProtocolHandler;
pub use session::LatexSession;
pub use transport::StdioTransport;
