//! Transport configuration types.
//!
//! The run mode is resolved exactly once at startup from the `PORT`
//! environment variable: present selects HTTP bound to `0.0.0.0`, absent
//! selects stdio. Nothing re-checks the environment per request.

use serde::{Deserialize, Serialize};

use super::error::{TransportError, TransportResult};

/// Host HTTP mode binds to. Deployment platforms route to the container, so
/// the listener must accept external connections.
#[cfg(feature = "http")]
const HTTP_HOST: &str = "0.0.0.0";

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport (default for MCP).
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport with JSON-RPC over POST.
    #[cfg(feature = "http")]
    Http(HttpConfig),
}

/// HTTP transport configuration.
#[cfg(feature = "http")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path for the JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    HTTP_HOST.to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// HTTP config for a port with default host and path.
    pub fn on_port(port: u16) -> Self {
        Self {
            port,
            host: default_host(),
            rpc_path: default_rpc_path(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "stdio")]
        {
            return Self::Stdio;
        }

        #[cfg(all(not(feature = "stdio"), feature = "http"))]
        {
            return Self::Http(HttpConfig::on_port(8080));
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

impl TransportConfig {
    /// Resolve the transport from the `PORT` environment variable.
    ///
    /// A present `PORT` must parse as a positive integer; anything else is a
    /// fatal configuration error rather than a silent fallback to stdio.
    pub fn from_env() -> TransportResult<Self> {
        match std::env::var("PORT") {
            Ok(raw) => Self::for_port_value(&raw),
            Err(std::env::VarError::NotPresent) => Self::stdio_mode(),
            Err(e) => Err(TransportError::invalid_config(format!(
                "PORT is not valid unicode: {}",
                e
            ))),
        }
    }

    fn stdio_mode() -> TransportResult<Self> {
        #[cfg(feature = "stdio")]
        {
            Ok(Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            Err(TransportError::invalid_config(
                "PORT is unset but the stdio transport was not compiled in",
            ))
        }
    }

    fn for_port_value(raw: &str) -> TransportResult<Self> {
        #[cfg(feature = "http")]
        {
            let port: u16 = raw.trim().parse().map_err(|_| {
                TransportError::invalid_config(format!(
                    "PORT must be a positive integer, got '{}'",
                    raw
                ))
            })?;
            if port == 0 {
                return Err(TransportError::invalid_config(
                    "PORT must be a positive integer, got '0'",
                ));
            }
            Ok(Self::Http(HttpConfig::on_port(port)))
        }
        #[cfg(not(feature = "http"))]
        {
            let _ = raw;
            Err(TransportError::invalid_config(
                "PORT is set but the HTTP transport was not compiled in",
            ))
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "stdio (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard stdio mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

/// Serializes tests that mutate process environment variables.
#[cfg(test)]
pub(crate) static ENV_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;

    fn with_port<R>(value: Option<&str>, f: impl FnOnce() -> R) -> R {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            match value {
                Some(v) => std::env::set_var("PORT", v),
                None => std::env::remove_var("PORT"),
            }
        }
        let result = f();
        unsafe {
            std::env::remove_var("PORT");
        }
        result
    }

    #[cfg(feature = "stdio")]
    #[test]
    fn test_no_port_selects_stdio() {
        let config = with_port(None, || TransportConfig::from_env()).unwrap();
        assert!(config.is_stdio());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_port_selects_http() {
        let config = with_port(Some("8080"), || TransportConfig::from_env()).unwrap();
        match config {
            TransportConfig::Http(http) => {
                assert_eq!(http.port, 8080);
                assert_eq!(http.host, "0.0.0.0");
                assert_eq!(http.rpc_path, "/mcp");
            }
            #[cfg(feature = "stdio")]
            other => panic!("expected HTTP transport, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_port_is_fatal() {
        let result = with_port(Some("smithery"), || TransportConfig::from_env());
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_port_is_fatal() {
        let result = with_port(Some("0"), || TransportConfig::from_env());
        assert!(result.is_err());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_out_of_range_port_is_fatal() {
        let result = with_port(Some("70000"), || TransportConfig::from_env());
        assert!(result.is_err());
    }
}
