//! A2A HTTP server.
//!
//! Serves the agent card at `/.well-known/agent-card.json` and a JSON-RPC
//! endpoint at `/` supporting `message/send` and `tasks/get`. The card is
//! rebuilt per request from the current registry snapshot so a hot reload
//! shows up immediately.

use crate::card::build_agent_card;
use crate::executor::TaskExecutor;
use crate::types::Message;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use dataq_agents::Dispatcher;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct RpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Value>,
}

impl RpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(json!({ "code": code, "message": message.into() })),
        }
    }
}

struct A2aState {
    executor: TaskExecutor,
    dispatcher: Arc<Dispatcher>,
    host: String,
    port: u16,
}

pub struct A2aServer {
    state: Arc<A2aState>,
}

impl A2aServer {
    pub fn new(dispatcher: Arc<Dispatcher>, host: impl Into<String>, port: u16) -> Self {
        Self {
            state: Arc::new(A2aState {
                executor: TaskExecutor::new(dispatcher.clone()),
                dispatcher,
                host: host.into(),
                port,
            }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/.well-known/agent-card.json", get(card_handler))
            .route("/", post(rpc_handler))
            .route("/health", get(health_handler))
            .with_state(self.state.clone())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
    }

    pub async fn serve(self, bind_addr: &str) -> Result<()> {
        info!(addr = %bind_addr, "Starting A2A server");
        let listener = tokio::net::TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?;
        axum::serve(listener, self.router())
            .await
            .context("A2A server failed")?;
        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "dataq-a2a" }))
}

async fn card_handler(State(state): State<Arc<A2aState>>) -> impl IntoResponse {
    let registry = state.dispatcher.registry().snapshot().await;
    Json(build_agent_card(&state.host, state.port, &registry))
}

async fn rpc_handler(
    State(state): State<Arc<A2aState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let request: RpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            return Json(RpcResponse::error(None, -32700, format!("parse error: {e}")));
        }
    };

    let response = match request.method.as_str() {
        "message/send" => handle_message_send(&state, request.id, request.params).await,
        "tasks/get" => handle_tasks_get(&state, request.id, request.params).await,
        "tasks/cancel" => RpcResponse::error(
            request.id,
            -32002,
            "cancellation is not supported; tasks run to completion",
        ),
        other => RpcResponse::error(request.id, -32601, format!("method not found: {other}")),
    };
    Json(response)
}

async fn handle_message_send(
    state: &A2aState,
    id: Option<Value>,
    params: Option<Value>,
) -> RpcResponse {
    let message: Message = match params
        .as_ref()
        .and_then(|p| p.get("message"))
        .cloned()
        .map(serde_json::from_value)
    {
        Some(Ok(message)) => message,
        Some(Err(e)) => {
            return RpcResponse::error(id, -32602, format!("invalid message: {e}"));
        }
        None => return RpcResponse::error(id, -32602, "missing required param: message"),
    };

    let task = state.executor.send_message(&message).await;
    match serde_json::to_value(&task) {
        Ok(result) => RpcResponse::success(id, result),
        Err(e) => RpcResponse::error(id, -32603, e.to_string()),
    }
}

async fn handle_tasks_get(
    state: &A2aState,
    id: Option<Value>,
    params: Option<Value>,
) -> RpcResponse {
    let Some(task_id) = params
        .as_ref()
        .and_then(|p| p.get("id"))
        .and_then(Value::as_str)
    else {
        return RpcResponse::error(id, -32602, "missing required param: id");
    };

    match state.executor.get_task(task_id).await {
        Some(task) => match serde_json::to_value(&task) {
            Ok(result) => RpcResponse::success(id, result),
            Err(e) => RpcResponse::error(id, -32603, e.to_string()),
        },
        None => RpcResponse::error(id, -32001, format!("task not found: {task_id}")),
    }
}
