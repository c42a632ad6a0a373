//! MCP Server implementation and lifecycle management.
//!
//! The handler owns the tool table built once at startup: every domain
//! registrar runs against the shared data source, and both transports
//! dispatch through the same registry. Adding a tool means adding a
//! registrar entry under `tools/`, not modifying this file.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};

use super::config::Config;
use crate::tools::{SharedDataSource, ToolRegistry, register_all_tools};

#[cfg(feature = "http")]
use tracing::info;

/// The main MCP server handler.
///
/// Implements the `ServerHandler` trait from rmcp and dispatches tool calls
/// through the registry populated at construction time.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The tool table shared by both transports.
    registry: Arc<ToolRegistry>,

    /// Tool router for the rmcp stdio service.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Usage guidance surfaced to MCP clients at initialization.
    pub const INSTRUCTIONS: &'static str = "Provides A-share (Chinese stock market) data: \
        historical K-lines, quarterly financial reports, index constituents, \
        macroeconomic series, trading calendar utilities, and summary analysis. \
        Stock codes use the lowercase prefixed form, e.g. 'sh.600000' or 'sz.000001'; \
        dates use the YYYY-MM-DD form.";

    /// Create a new MCP server over the given data source.
    ///
    /// Each domain registrar runs exactly once here; the registry preserves
    /// duplicates, so this is the only place registration should happen.
    pub fn new(config: Config, source: SharedDataSource) -> Self {
        let mut registry = ToolRegistry::new();
        register_all_tools(&mut registry, &source);

        Self {
            tool_router: registry.to_router(),
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The underlying tool table.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// List all available tools (for the HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.registry
            .tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for the HTTP transport).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        info!("Dispatching tool call: {}", name);
        let result = self
            .registry
            .call(name, arguments)
            .await
            .map_err(|e| e.message.to_string())?;

        Ok(serde_json::json!({
            "content": result.content,
            "isError": result.is_error.unwrap_or(false)
        }))
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(Self::INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
