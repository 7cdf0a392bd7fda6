//! dataq-mcp: MCP protocol front-end
//!
//! Thin ingress adapter exposing the dispatcher over the Model Context
//! Protocol. All intelligence lives behind `dataq_agents::Dispatcher`; this
//! crate only translates JSON-RPC methods into dispatcher calls.
//!
//! Methods:
//! - initialize / initialized / ping → handshake
//! - tools/list, tools/call → query, list_datasources, get_schema
//! - resources/list, resources/read → datasources://list, schema://{name}

pub mod protocol;
pub mod resources;
pub mod server;
pub mod transport;

pub use protocol::{McpRequest, McpResponse, RpcError};
pub use server::McpServer;
pub use transport::{HttpTransport, McpHandler, StdioTransport, Transport};
