//! HTTP Transport
//!
//! Single JSON-RPC POST endpoint at `/rpc` with permissive CORS, plus
//! `/health` for probes.

use super::{McpHandler, Transport};
use crate::protocol::{McpRequest, McpResponse, RpcError};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct HttpTransport {
    bind_addr: String,
    enable_cors: bool,
}

impl HttpTransport {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            enable_cors: true,
        }
    }

    pub fn without_cors(mut self) -> Self {
        self.enable_cors = false;
        self
    }

    /// Build the router without binding, used by the unified server.
    pub fn router<H: McpHandler + 'static>(&self, handler: Arc<H>) -> Router {
        let mut router = Router::new()
            .route("/rpc", post(rpc_handler::<H>))
            .route("/health", get(health_handler))
            .with_state(handler);

        if self.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }
        router
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn serve<H: McpHandler + 'static>(self, handler: Arc<H>) -> Result<()> {
        info!(addr = %self.bind_addr, "Starting MCP HTTP transport");

        let router = self.router(handler);
        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.bind_addr))?;
        axum::serve(listener, router)
            .await
            .context("MCP HTTP transport failed")?;
        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "dataq-mcp" }))
}

async fn rpc_handler<H: McpHandler + 'static>(
    State(handler): State<Arc<H>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let response = match serde_json::from_value::<McpRequest>(body) {
        Ok(request) => handler.handle_request(request).await,
        Err(e) => McpResponse::error(None, RpcError::parse_error(e.to_string())),
    };
    Json(response)
}
