//! MCP Server core implementation

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use file_tools::{ChromeRenderer, PdfRenderer};
use serde_json::{json, Value};

use super::protocol::*;
use super::tools;

/// The file manager MCP server
#[derive(Clone)]
pub struct FileManagerServer {
    /// Server name
    name: String,
    /// Server version
    version: String,
    /// Root every tool resolves paths against
    home: PathBuf,
    /// Tool-call timeout in milliseconds
    timeout_ms: u64,
    /// Page renderer used by the snapshot tool
    renderer: Arc<dyn PdfRenderer>,
}

impl FileManagerServer {
    /// Create a server rooted at `home`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            name: "file-manager".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            home: home.into(),
            timeout_ms: 120_000,
            renderer: Arc::new(ChromeRenderer::new()),
        }
    }

    /// Create with custom timeout
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Replace the snapshot renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Get server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get server version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get home root
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get timeout
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn renderer(&self) -> &dyn PdfRenderer {
        self.renderer.as_ref()
    }

    /// Handle a JSON-RPC request.
    ///
    /// Returns `None` for notifications, which never get a response.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, json!({})),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: self.name().to_string(),
                version: self.version().to_string(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INVALID_PARAMS, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        match tools::handle_tool_call(self, name, arguments).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": content,
                    "isError": false
                }),
            ),
            Err(e) => {
                tracing::error!("Tool '{}' failed: {}", name, e);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "content": [{"type": "text", "text": format!("Error: {}", e)}],
                        "isError": true
                    }),
                )
            }
        }
    }
}

impl fmt::Debug for FileManagerServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileManagerServer")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("home", &self.home)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

fn handle_list_tools(id: Option<Value>) -> JsonRpcResponse {
    let tools = tools::get_tool_definitions();
    JsonRpcResponse::success(id, json!({ "tools": tools }))
}
