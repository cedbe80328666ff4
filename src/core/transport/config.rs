//! Transport configuration types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::core::config::env_var;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP transport: REST tool endpoints plus JSON-RPC over POST.
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

    /// Path for JSON-RPC endpoint.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,
}

#[cfg(feature = "http")]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "http")]
fn default_rpc_path() -> String {
    "/mcp".to_string()
}

#[cfg(feature = "http")]
fn default_cors() -> bool {
    true
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "http")]
        {
            return Self::Http(HttpConfig::default());
        }

        #[cfg(all(not(feature = "http"), feature = "stdio"))]
        {
            return Self::Stdio;
        }

        #[cfg(not(any(feature = "stdio", feature = "http")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or http");
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: default_host(),
            rpc_path: default_rpc_path(),
            enable_cors: default_cors(),
        }
    }
}

#[cfg(feature = "http")]
impl HttpConfig {
    /// Read `MCP_HTTP_*` variables, with `PORT` accepted for the port.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_var(&["MCP_HTTP_PORT", "PORT"])
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            host: env_var(&["MCP_HTTP_HOST"]).unwrap_or(defaults.host),
            rpc_path: env_var(&["MCP_HTTP_PATH"]).unwrap_or(defaults.rpc_path),
            enable_cors: env_var(&["MCP_HTTP_CORS"])
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enable_cors),
        }
    }
}

impl TransportConfig {
    /// Create a STDIO transport config.
    #[cfg(feature = "stdio")]
    pub fn stdio() -> Self {
        Self::Stdio
    }

    /// Create an HTTP transport config.
    #[cfg(feature = "http")]
    pub fn http(port: u16, host: impl Into<String>) -> Self {
        Self::Http(HttpConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    ///
    /// `MCP_TRANSPORT` picks the transport; anything unrecognised falls back
    /// to the default (HTTP when compiled in).
    pub fn from_env() -> Self {
        let transport = std::env::var("MCP_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "http")]
            _ => Self::Http(HttpConfig::from_env()),
            #[cfg(not(feature = "http"))]
            _ => Self::default(),
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "http")]
            Self::Http(cfg) => format!("HTTP on {}:{}{}", cfg.host, cfg.port, cfg.rpc_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
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

#[cfg(all(test, feature = "http", feature = "stdio"))]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_http_on_port_3000() {
        match TransportConfig::default() {
            TransportConfig::Http(cfg) => {
                assert_eq!(cfg.port, 3000);
                assert_eq!(cfg.host, "0.0.0.0");
                assert_eq!(cfg.rpc_path, "/mcp");
                assert!(cfg.enable_cors);
            }
            other => panic!("unexpected transport: {other:?}"),
        }
    }

    #[test]
    fn test_description() {
        assert_eq!(
            TransportConfig::http(8080, "127.0.0.1").description(),
            "HTTP on 127.0.0.1:8080/mcp"
        );
        assert!(TransportConfig::stdio().is_stdio());
    }
}
