//! MCP Server
//!
//! Transport-agnostic protocol logic: one `handle_request` entry point that
//! the stdio and HTTP transports both drive. Tool failures come back as tool
//! results flagged `isError` so clients can show them conversationally;
//! protocol-level errors use JSON-RPC error codes.

use crate::protocol::{McpRequest, McpResponse, RpcError, PROTOCOL_VERSION};
use crate::resources::{list_resources, read_resource, render_datasources, render_schema};
use dataq_agents::{Dispatcher, QueryRequest};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info};

pub const SERVER_NAME: &str = "dataq";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "\
dataq is a natural language to SQL platform. Use the 'query' tool to ask
questions about data; the platform routes each question to the right
datasource and generates a dialect-correct query. 'list_datasources' shows
what is configured, 'get_schema' inspects one datasource.

Always include the SQL query that was executed in your response to the user.";

/// MCP protocol server over the shared dispatcher.
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn handle_request(&self, request: McpRequest) -> McpResponse {
        debug!(method = %request.method, "Handling MCP request");

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "initialized" | "notifications/initialized" => {
                McpResponse::success(request.id, json!({}))
            }
            "ping" => McpResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => self.handle_resources_list(request).await,
            "resources/read" => self.handle_resources_read(request).await,
            _ => McpResponse::error(request.id, RpcError::method_not_found(&request.method)),
        }
    }

    fn handle_initialize(&self, request: McpRequest) -> McpResponse {
        let client = request
            .params
            .as_ref()
            .and_then(|p| p.pointer("/clientInfo/name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(client = %client, "MCP client connected");

        McpResponse::success(
            request.id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": { "listChanged": false },
                    "resources": { "subscribe": false, "listChanged": false },
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION,
                },
                "instructions": INSTRUCTIONS,
            }),
        )
    }

    fn handle_tools_list(&self, request: McpRequest) -> McpResponse {
        McpResponse::success(request.id, json!({ "tools": tool_definitions() }))
    }

    async fn handle_tools_call(&self, request: McpRequest) -> McpResponse {
        let params = request.params.clone().unwrap_or_default();
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return McpResponse::error(request.id, RpcError::invalid_params("missing tool name"));
        };
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let result = match name {
            "query" => self.tool_query(&arguments).await,
            "list_datasources" => self.tool_list_datasources().await,
            "get_schema" => self.tool_get_schema(&arguments).await,
            other => {
                return McpResponse::error(
                    request.id,
                    RpcError::invalid_params(format!("unknown tool: {other}")),
                );
            }
        };

        match result {
            Ok(text) => McpResponse::success(request.id, tool_text_result(&text, false)),
            Err(message) => {
                error!(tool = %name, error = %message, "Tool call failed");
                McpResponse::success(request.id, tool_text_result(&message, true))
            }
        }
    }

    async fn tool_query(&self, arguments: &Value) -> Result<String, String> {
        let Some(question) = arguments.get("question").and_then(Value::as_str) else {
            return Err("missing required argument: question".to_string());
        };
        let mut query = QueryRequest::new(question);
        if let Some(datasource) = arguments.get("datasource").and_then(Value::as_str) {
            query = query.with_agent(datasource);
        }

        self.dispatcher
            .handle(query)
            .await
            .map(|response| response.answer)
            .map_err(|e| format!("Error executing query: {e}"))
    }

    async fn tool_list_datasources(&self) -> Result<String, String> {
        let registry = self.dispatcher.registry().snapshot().await;
        Ok(render_datasources(&registry))
    }

    async fn tool_get_schema(&self, arguments: &Value) -> Result<String, String> {
        let Some(name) = arguments.get("datasource").and_then(Value::as_str) else {
            return Err("missing required argument: datasource".to_string());
        };
        let registry = self.dispatcher.registry().snapshot().await;
        match registry.get(name) {
            Ok(agent) => Ok(render_schema(&agent)),
            Err(_) => Err(format!(
                "Datasource '{name}' not found. Available: {}",
                registry.names().join(", ")
            )),
        }
    }

    async fn handle_resources_list(&self, request: McpRequest) -> McpResponse {
        let registry = self.dispatcher.registry().snapshot().await;
        McpResponse::success(request.id, json!({ "resources": list_resources(&registry) }))
    }

    async fn handle_resources_read(&self, request: McpRequest) -> McpResponse {
        let uri = request
            .params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let registry = self.dispatcher.registry().snapshot().await;
        match read_resource(&registry, &uri) {
            Some(text) => McpResponse::success(
                request.id,
                json!({
                    "contents": [{ "uri": uri, "mimeType": "text/plain", "text": text }]
                }),
            ),
            None => McpResponse::error(
                request.id,
                RpcError::invalid_params(format!("unknown resource: {uri}")),
            ),
        }
    }
}

fn tool_text_result(text: &str, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}

fn tool_definitions() -> Value {
    json!([
        {
            "name": "query",
            "description": "Execute a natural language query against the configured datasources. \
                            Routes the question automatically unless a datasource is given.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "Natural language question to answer"
                    },
                    "datasource": {
                        "type": "string",
                        "description": "Optional datasource name to target directly"
                    }
                },
                "required": ["question"]
            }
        },
        {
            "name": "list_datasources",
            "description": "List all configured datasources available for querying.",
            "inputSchema": { "type": "object", "properties": {} }
        },
        {
            "name": "get_schema",
            "description": "Get the database schema for a specific datasource.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "datasource": {
                        "type": "string",
                        "description": "Datasource name (see list_datasources)"
                    }
                },
                "required": ["datasource"]
            }
        }
    ])
}
