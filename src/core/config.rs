//! Configuration management for the server.
//!
//! Centralized configuration populated from environment variables with
//! sensible defaults. Everything is resolved once at startup.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::{Error, Result};
use super::transport::TransportConfig;

/// Static API key accepted by the HTTP gate when no override is configured.
///
/// Deliberately a published demo secret: the gate exists for request shaping,
/// not security (see `transport::auth`).
pub const DEFAULT_API_KEY: &str = "sk-example123";

/// Main configuration structure for the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// HTTP API-key gate configuration.
    pub auth: AuthConfig,

    /// Data provider gateway configuration.
    pub datasource: DataSourceConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// HTTP API-key gate configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Accepted API key; `None` disables the gate entirely.
    pub api_key: Option<String>,
}

/// Custom Debug implementation to redact the key from logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Data provider gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Base URL of the baostock gateway service.
    pub gateway_url: String,

    /// Per-request timeout, seconds.
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: Some(DEFAULT_API_KEY.to_string()),
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://127.0.0.1:8765".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "a_share_data_provider".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            auth: AuthConfig::default(),
            datasource: DataSourceConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Fails when `PORT` is present but does not parse as a positive
    /// integer; that is a startup abort, not a fallback.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env().map_err(|e| Error::config(e.to_string()))?;

        if let Ok(api_key) = std::env::var("MCP_API_KEY") {
            config.auth.api_key = Some(api_key);
            info!("API key loaded from environment");
        }

        if let Ok(url) = std::env::var("BAOSTOCK_GATEWAY_URL") {
            config.datasource.gateway_url = url;
        } else {
            warn!(
                "BAOSTOCK_GATEWAY_URL not set, using default gateway {}",
                config.datasource.gateway_url
            );
        }

        if let Ok(timeout) = std::env::var("BAOSTOCK_TIMEOUT_SECS") {
            config.datasource.timeout_secs = timeout
                .parse()
                .map_err(|_| Error::config(format!("Invalid BAOSTOCK_TIMEOUT_SECS '{}'", timeout)))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::config::ENV_TEST_LOCK;

    #[test]
    fn test_default_has_demo_key() {
        let config = Config::default();
        assert_eq!(config.auth.api_key.as_deref(), Some(DEFAULT_API_KEY));
    }

    #[test]
    fn test_auth_redacted_in_debug() {
        let auth = AuthConfig {
            api_key: Some("super_secret_key".to_string()),
        };
        let debug_str = format!("{:?}", auth);
        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("super_secret_key"));
    }

    #[test]
    fn test_from_env_overrides() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::remove_var("PORT");
            std::env::set_var("MCP_SERVER_NAME", "test_provider");
            std::env::set_var("MCP_API_KEY", "sk-test");
            std::env::set_var("BAOSTOCK_GATEWAY_URL", "http://gateway:9000");
        }
        let config = Config::from_env().unwrap();
        unsafe {
            std::env::remove_var("MCP_SERVER_NAME");
            std::env::remove_var("MCP_API_KEY");
            std::env::remove_var("BAOSTOCK_GATEWAY_URL");
        }

        assert_eq!(config.server.name, "test_provider");
        assert_eq!(config.auth.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.datasource.gateway_url, "http://gateway:9000");
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        unsafe {
            std::env::set_var("PORT", "not-a-port");
        }
        let result = Config::from_env();
        unsafe {
            std::env::remove_var("PORT");
        }
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
