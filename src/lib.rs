//! A-share financial data MCP server.
//!
//! This crate provides a Model Context Protocol (MCP) server exposing
//! Chinese A-share market data as tools: historical K-lines, quarterly
//! financial reports, index constituents, macroeconomic series, trading
//! calendar utilities, and summary analysis.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling,
//!   the main server handler, and the transport layer (stdio and HTTP)
//! - **datasource**: The [`datasource::FinancialDataSource`] trait, the
//!   tabular result frame, and the baostock gateway adapter
//! - **tools**: Tool registrars grouped by functional domain, all feeding
//!   a single [`tools::ToolRegistry`]
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ashare_mcp_server::core::{Config, McpServer, TransportService};
//! use ashare_mcp_server::datasource::BaostockDataSource;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let source = Arc::new(BaostockDataSource::new(&config.datasource)?);
//!     let server = McpServer::new(config.clone(), source);
//!     let transport = TransportService::new(config.transport);
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod datasource;
pub mod tools;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
