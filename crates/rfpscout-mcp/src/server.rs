//! MCP server implementation

use crate::protocol::*;
use crate::{resources, tools};
use anyhow::Result;
use rfpscout_core::{SchemaSampler, SearchBackend};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    search: Arc<dyn SearchBackend>,
    schema: SchemaSampler,
}

impl McpServer {
    pub fn new(search: Arc<dyn SearchBackend>) -> Self {
        Self {
            search,
            schema: SchemaSampler::new(),
        }
    }

    /// Serve requests on stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }

    /// Serve one JSON-RPC request per line from `reader`
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response =
                        JsonRpcResponse::error(None, PARSE_ERROR, &format!("Parse error: {}", e));
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            if request.is_notification() {
                tracing::debug!(method = %request.method, "Ignoring notification");
                continue;
            }

            let response = self.handle_request(&request).await;
            write_response(&mut writer, &response).await?;
        }

        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "MCP request");

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request).await,
            "tools/call" => self.handle_tools_call(request).await,
            "resources/list" => self.handle_resources_list(request),
            "resources/read" => self.handle_resources_read(request).await,
            "prompts/list" => self.handle_prompts_list(request),
            _ => JsonRpcResponse::error(
                request.id.clone(),
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {},
                "resources": { "subscribe": false },
                "prompts": {}
            },
            "serverInfo": {
                "name": "rfpscout",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    async fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let schema = self.schema.discover(self.search.as_ref()).await;
        let tools = tools::tool_definitions(&schema);

        JsonRpcResponse::success(request.id.clone(), json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or_else(|| json!({}));

        let result = match tools::handle_call(self.search.as_ref(), name, arguments).await {
            Ok(result) => result,
            Err(e) => ToolResult::error(format!("Error: {}", e)),
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                INVALID_PARAMS,
                &format!("Failed to encode tool result: {}", e),
            ),
        }
    }

    fn handle_resources_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            request.id.clone(),
            json!({ "resources": resources::list_resources() }),
        )
    }

    async fn handle_resources_read(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let uri = request
            .params
            .get("uri")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let schema = self.schema.discover(self.search.as_ref()).await;
        match resources::read_resource(uri, &schema) {
            Ok(content) => {
                JsonRpcResponse::success(request.id.clone(), json!({ "contents": [content] }))
            }
            Err(e) => JsonRpcResponse::error(request.id.clone(), INVALID_PARAMS, &e.to_string()),
        }
    }

    fn handle_prompts_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let prompts = vec![json!({
            "name": "rfp_search",
            "title": "RFP Search Guide",
            "description": "How to find RFPs by keyword, date range and location, and how to ask for pursuit statistics"
        })];
        JsonRpcResponse::success(request.id.clone(), json!({ "prompts": prompts }))
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn start_server(search: Arc<dyn SearchBackend>) -> Result<()> {
    tracing::info!(index = %search.index_name(), "Starting MCP server on stdio");
    let server = McpServer::new(search);
    server.run().await
}
