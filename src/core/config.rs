//! Configuration management for the MCP server.
//!
//! The configuration is built once at process start and shared by `Arc`
//! with every service that needs it. Nothing reads the environment after
//! [`Config::from_env`] returns.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

use crate::domains::auth::parse_token_map;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Generative-text credentials and sampling policy.
    pub generation: GenerationConfig,

    /// Bearer token to phone number directory.
    pub auth: AuthConfig,

    /// Upstream endpoints and HTTP client policy.
    pub upstreams: UpstreamConfig,
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

/// Configuration for the generative-text upstream.
#[derive(Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Gemini API key. Tool calls that need it fail when absent.
    pub api_key: Option<String>,

    /// Model name used in the generateContent endpoint.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Output length cap in tokens.
    pub max_output_tokens: u32,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

/// Static bearer-token directory used by the `validate` tool.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Token to raw phone number.
    pub token_map: HashMap<String, String>,

    /// Phone returned for unknown tokens in single-owner setups.
    pub owner_phone: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_map", &format!("[{} REDACTED]", self.token_map.len()))
            .field("owner_phone", &self.owner_phone.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Upstream endpoints and outbound HTTP policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// User agent sent on every outbound request.
    pub user_agent: String,

    /// Nominatim base URL (geocoding).
    pub nominatim_url: String,

    /// Open-Meteo base URL (weather).
    pub open_meteo_url: String,

    /// Overpass base URL (points of interest).
    pub overpass_url: String,

    /// Generative Language API base URL.
    pub gemini_url: String,

    /// Pause after a successful geocode, in milliseconds.
    pub geocode_delay_ms: u64,

    /// Per-request timeout for outbound calls, in seconds.
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    pub fn geocode_delay(&self) -> Duration {
        Duration::from_millis(self.geocode_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            temperature: 0.8,
            max_output_tokens: 512,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: "BudgetDate/1.0 (+https://puch.ai)".to_string(),
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            open_meteo_url: "https://api.open-meteo.com".to_string(),
            overpass_url: "https://overpass-api.de".to_string(),
            gemini_url: "https://generativelanguage.googleapis.com".to_string(),
            geocode_delay_ms: 1200,
            timeout_secs: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "budget-date-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            generation: GenerationConfig::default(),
            auth: AuthConfig::default(),
            upstreams: UpstreamConfig::default(),
        }
    }
}

/// First non-empty value among the given environment variables.
pub(crate) fn env_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn env_parse<T: std::str::FromStr>(names: &[&str]) -> Option<T> {
    env_var(names).and_then(|value| value.parse().ok())
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables (and a `.env` file if present).
    ///
    /// Variables are prefixed with `MCP_`; the unprefixed names used by older
    /// deployments (`GEMINI_API_KEY`, `OWNER_PHONE`, ...) are accepted as fallback.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Some(name) = env_var(&["MCP_SERVER_NAME"]) {
            config.server.name = name;
        }

        if let Some(level) = env_var(&["MCP_LOG_LEVEL", "LOG_LEVEL"]) {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();

        // Generative upstream
        config.generation.api_key = env_var(&["MCP_GEMINI_API_KEY", "GEMINI_API_KEY"]);
        if let Some(model) = env_var(&["MCP_GEMINI_MODEL", "GEMINI_MODEL"]) {
            config.generation.model = model;
        }
        if let Some(temperature) = env_parse(&["MCP_GEMINI_TEMPERATURE"]) {
            config.generation.temperature = temperature;
        }
        if let Some(max_tokens) = env_parse(&["MCP_GEMINI_MAX_OUTPUT_TOKENS"]) {
            config.generation.max_output_tokens = max_tokens;
        }

        // Token directory
        if let Some(raw) = env_var(&["MCP_VALIDATE_TOKEN_MAP", "VALIDATE_TOKEN_MAP"]) {
            config.auth.token_map = parse_token_map(&raw);
        }
        config.auth.owner_phone = env_var(&["MCP_OWNER_PHONE", "OWNER_PHONE"]);

        // Upstreams
        let upstreams = &mut config.upstreams;
        if let Some(ua) = env_var(&["MCP_USER_AGENT"]) {
            upstreams.user_agent = ua;
        }
        if let Some(url) = env_var(&["MCP_NOMINATIM_URL"]) {
            upstreams.nominatim_url = url;
        }
        if let Some(url) = env_var(&["MCP_OPEN_METEO_URL"]) {
            upstreams.open_meteo_url = url;
        }
        if let Some(url) = env_var(&["MCP_OVERPASS_URL"]) {
            upstreams.overpass_url = url;
        }
        if let Some(url) = env_var(&["MCP_GEMINI_URL"]) {
            upstreams.gemini_url = url;
        }
        if let Some(delay) = env_parse(&["MCP_GEOCODE_DELAY_MS"]) {
            upstreams.geocode_delay_ms = delay;
        }
        if let Some(timeout) = env_parse(&["MCP_UPSTREAM_TIMEOUT_SECS"]) {
            upstreams.timeout_secs = timeout;
        }

        config
    }

    /// Problems worth flagging at startup; none of them stop the server.
    pub fn startup_warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.generation.api_key.is_none() {
            warnings.push("GEMINI_API_KEY not set - budgetDate calls will fail until it is configured");
        }
        if self.auth.token_map.is_empty() && self.auth.owner_phone.is_none() {
            warnings.push("No validate tokens and no OWNER_PHONE configured - every token will be rejected");
        }
        warnings
    }

    /// Log what was loaded. Call once the subscriber is installed.
    pub fn log_summary(&self) {
        if self.generation.api_key.is_some() {
            info!(model = %self.generation.model, "Gemini API key loaded");
        }
        info!(
            tokens = self.auth.token_map.len(),
            owner_fallback = self.auth.owner_phone.is_some(),
            "Token directory configured"
        );
        for warning in self.startup_warnings() {
            warn!("{warning}");
        }
    }
}
