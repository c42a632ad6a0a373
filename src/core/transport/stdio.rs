//! STDIO transport implementation.
//!
//! The mode MCP hosts like Claude Desktop use: one logical session over
//! stdin/stdout, ending when the host closes the stream. Stdout carries
//! protocol frames only; all logging goes to stderr.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Serve one MCP session over stdin/stdout, blocking until the host
    /// disconnects.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - serving MCP over stdin/stdout");

        let session = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        let quit_reason = session
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!("STDIO session closed: {:?}", quit_reason);
        Ok(())
    }
}
