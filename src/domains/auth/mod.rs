//! Bearer token directory.
//!
//! Maps the static tokens handed out to clients onto the owner's phone
//! number. The directory is built once from [`AuthConfig`] and is read-only
//! afterwards.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::config::AuthConfig;
use crate::domains::tools::{ToolError, ToolResult};

/// Parse a `token:phone,token2:phone2` list.
///
/// Pairs are trimmed; pairs with an empty token or phone are skipped.
pub fn parse_token_map(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.split(':');
            let token = parts.next()?.trim();
            let phone = parts.next()?.trim();
            (!token.is_empty() && !phone.is_empty()).then(|| (token.to_string(), phone.to_string()))
        })
        .collect()
}

/// Strip everything but ASCII digits (`"+1 (555) 123-4567"` → `"15551234567"`).
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Read-only lookup from bearer token to phone number.
#[derive(Debug, Clone, Default)]
pub struct TokenDirectory {
    tokens: HashMap<String, String>,
    owner_phone: Option<String>,
}

impl TokenDirectory {
    pub fn new(tokens: HashMap<String, String>, owner_phone: Option<String>) -> Self {
        Self {
            tokens,
            owner_phone,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.token_map.clone(), config.owner_phone.clone())
    }

    /// Resolve a token to the normalized phone digits of its owner.
    ///
    /// Unknown tokens fall back to the configured owner phone; without one the
    /// call is rejected as unauthorized.
    pub fn resolve(&self, token: &str) -> ToolResult<String> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ToolError::bad_request("token must be a non-empty string"));
        }

        let phone = match self.tokens.get(token) {
            Some(phone) => phone,
            None => {
                debug!("Token not in directory, trying owner fallback");
                self.owner_phone.as_ref().ok_or_else(|| {
                    warn!("Rejected unknown bearer token");
                    ToolError::unauthorized("token not recognized and OWNER_PHONE not set")
                })?
            }
        };

        let digits = normalize_phone(phone);
        if digits.is_empty() {
            return Err(ToolError::bad_request("Invalid phone mapping"));
        }
        Ok(digits)
    }
}
