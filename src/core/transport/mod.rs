//! Transport layer for the MCP server.
//!
//! Two run modes, selected once at startup from the `PORT` environment
//! variable:
//! - **stdio** (`PORT` unset): standard input/output, one logical session -
//!   feature: `stdio`
//! - **HTTP** (`PORT` set): JSON-RPC over POST on `0.0.0.0:PORT`, with an
//!   optional API-key gate - feature: `http`
//!
//! Each transport handles the connection lifecycle and delegates message
//! processing to the MCP server handler.

pub mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod auth;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
