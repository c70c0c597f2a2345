//! Line-oriented JSON-RPC tool server.
//!
//! Exposes the query service as four tools behind a small JSON-RPC dispatch:
//! `searchComponents`, `getComponent`, `listCategories` and `listComponents`.
//! Two transports share the dispatch: newline-delimited JSON over stdio (the
//! default) and the same framing over TCP for interactive clients. Unknown
//! methods get an empty object rather than an error, which keeps permissive
//! clients happy during handshake.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::query::{QueryError, QueryService};

pub const PARSE_ERROR: i64 = -32700;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
/// Server-defined code for name lookups that matched nothing.
pub const NOT_FOUND: i64 = -32002;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "bitscrape-mcp";

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcErrorBody {
                code,
                message: message.into(),
            }),
        }
    }
}

struct ToolFailure {
    code: i64,
    message: String,
}

impl From<QueryError> for ToolFailure {
    fn from(e: QueryError) -> Self {
        let code = match &e {
            QueryError::InvalidParams(_) => INVALID_PARAMS,
            QueryError::NotFound(_) => NOT_FOUND,
            QueryError::Internal(_) => INTERNAL_ERROR,
        };
        ToolFailure {
            code,
            message: e.to_string(),
        }
    }
}

/// JSON-RPC front end over a [`QueryService`].
pub struct ToolServer {
    query: QueryService,
}

impl ToolServer {
    pub fn new(query: QueryService) -> Self {
        Self { query }
    }

    /// Tool descriptors surfaced by `tools/list`.
    fn tool_descriptors() -> Value {
        json!([
            {
                "name": "searchComponents",
                "description": "Search for React components by keyword or description",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Search query for finding components by name, description, or category"
                        },
                        "category": {
                            "type": "string",
                            "description": "Optional filter by category: 'components', 'backgrounds', or 'animations'",
                            "enum": ["components", "backgrounds", "animations"]
                        }
                    },
                    "required": ["query"]
                }
            },
            {
                "name": "getComponent",
                "description": "Get complete details about a specific component by name",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Exact name of the component to retrieve"
                        }
                    },
                    "required": ["name"]
                }
            },
            {
                "name": "listCategories",
                "description": "List all available component categories",
                "inputSchema": {
                    "type": "object",
                    "properties": {},
                    "required": []
                }
            },
            {
                "name": "listComponents",
                "description": "List available components, optionally filtered by category",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "category": {
                            "type": "string",
                            "description": "Optional category filter",
                            "enum": ["components", "backgrounds", "animations"]
                        }
                    },
                    "required": []
                }
            }
        ])
    }

    /// Handle one request. Returns `None` for notifications (no id), which
    /// must not be answered.
    pub async fn handle(&self, request: RpcRequest) -> Option<RpcResponse> {
        let id = request.id?;
        debug!("Handling {} [{}]", request.method, id);

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => RpcResponse::success(id, result),
            Err(failure) => RpcResponse::failure(id, failure.code, failure.message),
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, ToolFailure> {
        match method {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            "tools/list" => Ok(json!({ "tools": Self::tool_descriptors() })),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "prompts/list" => Ok(json!({ "prompts": [] })),
            // Unhandled methods get an empty object, not an error.
            other => {
                debug!("Ignoring unhandled method {other}");
                Ok(json!({}))
            }
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, ToolFailure> {
        let params = params.unwrap_or_else(|| json!({}));
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        let args = params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let category = args
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string);

        let text = match name {
            "searchComponents" => {
                let query = args.get("query").and_then(Value::as_str).unwrap_or("");
                self.query
                    .search_components(query, category.as_deref())
                    .await?
            }
            "getComponent" => {
                let component = args.get("name").and_then(Value::as_str).unwrap_or("");
                self.query.get_component(component).await?
            }
            "listCategories" => self.query.list_categories().await?,
            "listComponents" => self.query.list_components(category.as_deref()).await?,
            other => {
                return Err(ToolFailure {
                    code: METHOD_NOT_FOUND,
                    message: format!("Tool not found: {other}"),
                });
            }
        };

        Ok(json!({
            "content": [{ "type": "text", "text": text }]
        }))
    }

    async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<RpcRequest>(line) {
            Ok(request) => self.handle(request).await?,
            Err(e) => {
                warn!("Unparseable request: {e}");
                RpcResponse::failure(Value::Null, PARSE_ERROR, "Parse error")
            }
        };

        match serde_json::to_string(&response) {
            Ok(json) => Some(json),
            Err(e) => {
                error!("Failed to serialize response: {e}");
                None
            }
        }
    }

    /// Serve over stdio until EOF or SIGINT.
    ///
    /// SIGINT closes the store and returns; SIGTERM is logged and deliberately
    /// ignored so supervisor restarts do not kill in-flight sessions.
    pub async fn serve_stdio(&self) -> Result<()> {
        info!("Serving tools over stdio");

        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        #[cfg(unix)]
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("failed to install SIGTERM handler")?;

        loop {
            #[cfg(unix)]
            let sigterm_recv = sigterm.recv();
            #[cfg(not(unix))]
            let sigterm_recv = std::future::pending::<Option<()>>();

            tokio::select! {
                line = lines.next_line() => {
                    match line.context("stdin read failed")? {
                        Some(line) => {
                            if let Some(response) = self.handle_line(&line).await {
                                stdout.write_all(response.as_bytes()).await?;
                                stdout.write_all(b"\n").await?;
                                stdout.flush().await?;
                            }
                        }
                        None => {
                            info!("stdin closed, shutting down");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down server...");
                    break;
                }
                _ = sigterm_recv => {
                    info!("SIGTERM received, staying alive");
                }
            }
        }

        self.query.store().close().await;
        Ok(())
    }

    /// Serve over TCP with the same newline-delimited framing, one session
    /// per connection, until SIGINT.
    pub async fn serve_tcp(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Serving tools on tcp://{addr}");

        let server = std::sync::Arc::new(self);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted.context("accept failed")?;
                    debug!("Connection from {peer}");
                    let server = std::sync::Arc::clone(&server);
                    tokio::spawn(async move {
                        if let Err(e) = server.serve_connection(stream).await {
                            debug!("Session with {peer} ended: {e:#}");
                        }
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down server...");
                    break;
                }
            }
        }

        server.query.store().close().await;
        Ok(())
    }

    async fn serve_connection(&self, stream: tokio::net::TcpStream) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        while let Some(line) = lines.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }
}
