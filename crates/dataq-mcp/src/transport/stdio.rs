//! Stdio Transport
//!
//! Reads JSON-RPC from stdin, writes responses to stdout, one message per
//! line. Notifications get no response line.

use super::{McpHandler, Transport};
use crate::protocol::{McpRequest, McpResponse, RpcError};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

pub struct StdioTransport;

impl StdioTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Transport for StdioTransport {
    async fn serve<H: McpHandler + 'static>(self, handler: Arc<H>) -> Result<()> {
        info!("Starting MCP stdio transport");

        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();

        while let Some(line) = reader.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!(request = %line, "Received request");

            let response = match serde_json::from_str::<McpRequest>(line) {
                Ok(request) => {
                    let is_notification = request.is_notification();
                    let response = handler.handle_request(request).await;
                    if is_notification {
                        continue;
                    }
                    response
                }
                Err(e) => {
                    error!(error = %e, "Parse error");
                    McpResponse::error(None, RpcError::parse_error(e.to_string()))
                }
            };

            let response_json = serde_json::to_string(&response)?;
            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        info!("Stdio transport shutting down");
        Ok(())
    }
}
