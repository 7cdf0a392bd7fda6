//! Transport Layer
//!
//! Two transports drive the same protocol server:
//! - stdio (line-delimited JSON-RPC, the standard MCP client transport)
//! - HTTP (single POST endpoint plus health, for networked clients)

mod http;
mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use crate::protocol::{McpRequest, McpResponse};
use anyhow::Result;
use std::sync::Arc;

/// Protocol handler the transports drive.
#[async_trait::async_trait]
pub trait McpHandler: Send + Sync {
    async fn handle_request(&self, request: McpRequest) -> McpResponse;
}

#[async_trait::async_trait]
impl McpHandler for crate::server::McpServer {
    async fn handle_request(&self, request: McpRequest) -> McpResponse {
        self.handle_request(request).await
    }
}

/// Transport trait - implement for new transport types
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn serve<H: McpHandler + 'static>(self, handler: Arc<H>) -> Result<()>;
}
