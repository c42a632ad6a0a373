//! Tool registry - the server's tool table.
//!
//! Registration functions append `(domain, metadata, handler)` entries here;
//! each handler closes over the shared [`FinancialDataSource`] handle. The
//! registry is the single source of truth for both transports: the stdio
//! transport gets an `rmcp` [`ToolRouter`] built from it, the HTTP transport
//! dispatches through [`ToolRegistry::call`].
//!
//! The table is an ordered `Vec`, not a map: registering a domain twice
//! duplicates its entries. That is a documented limitation of the startup
//! sequence (each registrar runs exactly once), not something the registry
//! papers over. Lookup takes the first match.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::{CallToolResult, Tool},
};
use serde::de::DeserializeOwned;

use crate::datasource::FinancialDataSource;

/// The shared, process-wide data source handle.
pub type SharedDataSource = Arc<dyn FinancialDataSource>;

/// Boxed async tool handler: JSON arguments in, tool result out.
pub type ToolHandlerFn =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<CallToolResult, McpError>> + Send + Sync>;

/// One entry in the tool table.
pub struct RegisteredTool {
    /// Functional domain that registered the tool.
    pub domain: &'static str,

    /// MCP tool metadata (name, description, input schema).
    pub tool: Tool,

    /// Handler closed over the data source handle.
    pub handler: ToolHandlerFn,
}

/// Ordered tool table populated by the domain registrars.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw entry to the tool table.
    pub fn push(&mut self, domain: &'static str, tool: Tool, handler: ToolHandlerFn) {
        self.entries.push(RegisteredTool {
            domain,
            tool,
            handler,
        });
    }

    /// Register a typed tool function against the shared data source.
    ///
    /// `run` is the tool's async entry point; the registry wraps it with
    /// parameter deserialization and captures a clone of the source handle,
    /// so a source substituted before registration is the one every call
    /// resolves through.
    pub fn register<P, F, Fut>(
        &mut self,
        domain: &'static str,
        tool: Tool,
        source: &SharedDataSource,
        run: F,
    ) where
        P: DeserializeOwned + Send + 'static,
        F: Fn(SharedDataSource, P) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = CallToolResult> + Send + 'static,
    {
        let source = source.clone();
        let handler: ToolHandlerFn = Arc::new(move |arguments| {
            let source = source.clone();
            let run = run.clone();
            async move {
                let params: P = serde_json::from_value(arguments)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(run(source, params).await)
            }
            .boxed()
        });

        self.push(domain, tool, handler);
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[RegisteredTool] {
        &self.entries
    }

    /// Number of registered entries (duplicates included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered tool names, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.tool.name.to_string())
            .collect()
    }

    /// Tool metadata for `tools/list`.
    pub fn tools(&self) -> Vec<Tool> {
        self.entries.iter().map(|e| e.tool.clone()).collect()
    }

    /// First entry matching `name`.
    pub fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.entries.iter().find(|e| e.tool.name.as_ref() == name)
    }

    /// Dispatch a tool call by name.
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, McpError> {
        let entry = self
            .find(name)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {}", name), None))?;
        (entry.handler)(arguments).await
    }

    /// Build an `rmcp` router over the registered handlers for the stdio
    /// transport.
    pub fn to_router<S>(&self) -> ToolRouter<S>
    where
        S: Send + Sync + 'static,
    {
        let mut router = ToolRouter::new();
        for entry in &self.entries {
            let handler = entry.handler.clone();
            router = router.with_route(ToolRoute::new_dyn(
                entry.tool.clone(),
                move |ctx: ToolCallContext<'_, S>| {
                    let handler = handler.clone();
                    let args = ctx.arguments.clone().unwrap_or_default();
                    async move { handler(serde_json::Value::Object(args)).await }.boxed()
                },
            ));
        }
        router
    }
}
