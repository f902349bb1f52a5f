//! MCP Server implementation
//!
//! Implements the Model Context Protocol server over newline-delimited
//! JSON-RPC. Every request runs on its own task and a single writer task
//! emits responses as they complete, so responses are not ordered.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::config::cms::SERVER_NAME;
use crate::error::{CmsMcpError, McpError, Result, ValidationError};
use crate::mcp::prompts::PromptEngine;
use crate::mcp::registry::CapabilityRegistry;
use crate::mcp::resources::ResourceResolver;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;
use crate::store::PostStore;

/// MCP Server version
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the CMS
pub struct McpServer {
    /// Capability catalogs
    registry: Arc<CapabilityRegistry>,

    /// Tool handler
    tool_handler: ToolHandler,

    /// Resource resolver
    resources: ResourceResolver,

    /// Prompt templates
    prompts: PromptEngine,
}

impl McpServer {
    /// Create a new MCP server over a shared store handle
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        let registry = Arc::new(CapabilityRegistry::new(store.clone()));

        Self {
            tool_handler: ToolHandler::new(store.clone()),
            resources: ResourceResolver::new(registry.clone(), store),
            prompts: PromptEngine::new(),
            registry,
        }
    }

    /// Run the server on stdio
    pub async fn run_stdio(self: Arc<Self>) -> Result<()> {
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve requests read line by line from `reader` until it is closed.
    ///
    /// Returns once every request read so far has been answered. A line that
    /// is not UTF-8 gets a parse error; only a failing stream ends the loop.
    pub async fn serve<R, W>(self: Arc<Self>, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(rx, writer));

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => line.to_string(),
                Err(e) => {
                    warn!(error = %e, "Message is not valid UTF-8");
                    let response =
                        JsonRpcResponse::error(RequestId::Number(0), JsonRpcError::parse_error(e.to_string()));
                    if tx.send(response).is_err() {
                        error!("Response writer closed");
                    }
                    continue;
                }
            };

            let server = Arc::clone(&self);
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    if tx.send(response).is_err() {
                        error!("Response writer closed");
                    }
                }
            });
        }
        drop(tx);

        writer_task.await.map_err(|e| {
            CmsMcpError::Mcp(McpError::TransportError {
                message: e.to_string(),
            })
        })?
    }

    /// Handle an incoming JSON-RPC message
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Unparsable message");
                return Some(JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        // Well-formed JSON that is not a request (bad id type, missing method)
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "Invalid request");
                return Some(JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }
        let id = request.id.clone()?;

        debug!(method = %request.method, "Handling request");
        match self.dispatch(&request).await {
            Ok(result) => Some(JsonRpcResponse::success(id, result)),
            Err(err) => {
                warn!(method = %request.method, code = err.code, error = %err.message, "Request failed");
                Some(JsonRpcResponse::error(id, err))
            }
        }
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => debug!("Client initialized"),
            other => debug!(method = other, "Ignoring notification"),
        }
    }

    async fn dispatch(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(),
            methods::CALL_TOOL => self.handle_call_tool(request).await,
            methods::LIST_RESOURCES => self.handle_list_resources().await,
            methods::READ_RESOURCE => self.handle_read_resource(request).await,
            methods::LIST_PROMPTS => self.handle_list_prompts(),
            methods::GET_PROMPT => self.handle_get_prompt(request),
            other => return Err(JsonRpcError::method_not_found(other)),
        };
        result.map_err(JsonRpcError::from)
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> std::result::Result<Value, McpError> {
        to_value(InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
                resources: Some(ResourcesCapability::default()),
                prompts: Some(PromptsCapability::default()),
            },
        })
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> std::result::Result<Value, McpError> {
        to_value(ListToolsResult {
            tools: self.registry.list_tools().to_vec(),
        })
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> std::result::Result<Value, McpError> {
        let params: CallToolParams = params(request)?;
        let result = self.tool_handler.call_tool(&params.name, params.arguments).await?;
        to_value(result)
    }

    async fn handle_list_resources(&self) -> std::result::Result<Value, McpError> {
        to_value(ListResourcesResult {
            resources: self.resources.list_resources().await,
        })
    }

    async fn handle_read_resource(&self, request: &JsonRpcRequest) -> std::result::Result<Value, McpError> {
        let params: ReadResourceParams = params(request)?;
        to_value(self.resources.read_resource(&params.uri).await?)
    }

    fn handle_list_prompts(&self) -> std::result::Result<Value, McpError> {
        to_value(ListPromptsResult {
            prompts: self.registry.list_prompts().to_vec(),
        })
    }

    fn handle_get_prompt(&self, request: &JsonRpcRequest) -> std::result::Result<Value, McpError> {
        let params: GetPromptParams = params(request)?;
        let arguments = params.arguments.unwrap_or_default();
        to_value(self.prompts.get_prompt(&params.name, &arguments)?)
    }
}

fn params<T: DeserializeOwned>(request: &JsonRpcRequest) -> std::result::Result<T, McpError> {
    let params = request.params.clone().ok_or_else(|| {
        McpError::InvalidArguments(ValidationError::MissingField {
            field: "params".to_string(),
        })
    })?;

    serde_json::from_value(params)
        .map_err(|e| McpError::InvalidArguments(ValidationError::Constraint(e.to_string())))
}

fn to_value<T: Serialize>(value: T) -> std::result::Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::ProtocolError {
        message: e.to_string(),
    })
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let line = serde_json::to_string(&response)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
