//! Tool-specific error types.
//!
//! Every failure a tool call can produce is expressed as a [`ToolError`].
//! Adapters raise the most specific kind they can determine and the
//! transports map the kind to a status code with [`ToolError::status_code`].

use serde::Serialize;
use thiserror::Error;

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// A single schema violation found in upstream model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value (empty for the root).
    pub path: String,
    pub message: String,
}

/// Errors that can occur during tool operations.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Missing or malformed tool arguments, or a location that cannot be resolved.
    #[error("{0}")]
    BadRequest(String),

    /// Missing or unrecognized bearer token with no fallback owner.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An upstream service answered with a non-success status.
    #[error("{service} HTTP {status}: {body}")]
    Upstream {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// An upstream call succeeded but its payload was unusable.
    #[error("{message}")]
    BadGateway {
        message: String,
        details: Vec<ValidationIssue>,
    },

    /// A required credential or setting is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "bad request" error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Create a new "unauthorized" error.
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Create a new upstream error carrying the upstream status and body verbatim.
    pub fn upstream(service: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            status,
            body: body.into(),
        }
    }

    /// Create a new "bad gateway" error without validation details.
    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self::BadGateway {
            message: msg.into(),
            details: Vec::new(),
        }
    }

    /// Create a new "configuration" error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status the transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NotFound(_) => 404,
            Self::Upstream { status, .. } => *status,
            Self::BadGateway { .. } => 502,
            Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Upstream { .. } => "upstream_error",
            Self::BadGateway { .. } => "bad_gateway",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Render the error as a JSON body for transport responses.
    pub fn to_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        if let Self::BadGateway { details, .. } = self {
            if !details.is_empty() {
                payload["details"] = serde_json::json!(details);
            }
        }
        payload
    }
}

impl From<reqwest::Error> for ToolError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry credentials.
        let err = err.without_url();
        if err.is_decode() {
            Self::bad_gateway(format!("Upstream returned an unexpected payload: {err}"))
        } else if err.is_timeout() {
            Self::internal(format!("Upstream request timed out: {err}"))
        } else {
            Self::internal(format!("Upstream request failed: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_kind() {
        assert_eq!(ToolError::bad_request("x").status_code(), 400);
        assert_eq!(ToolError::unauthorized("x").status_code(), 401);
        assert_eq!(ToolError::not_found("x").status_code(), 404);
        assert_eq!(ToolError::bad_gateway("x").status_code(), 502);
        assert_eq!(ToolError::configuration("x").status_code(), 500);
        assert_eq!(ToolError::upstream("Overpass", 429, "slow down").status_code(), 429);
    }

    #[test]
    fn test_upstream_message_carries_status_and_body() {
        let err = ToolError::upstream("Gemini", 403, "API key invalid");
        assert_eq!(err.to_string(), "Gemini HTTP 403: API key invalid");
        assert_eq!(err.kind(), "upstream_error");
    }

    #[test]
    fn test_payload_includes_validation_details() {
        let err = ToolError::BadGateway {
            message: "Model output failed schema validation".to_string(),
            details: vec![ValidationIssue {
                path: "/steps".to_string(),
                message: "too short".to_string(),
            }],
        };
        let payload = err.to_payload();
        assert_eq!(payload["kind"], "bad_gateway");
        assert_eq!(payload["details"][0]["path"], "/steps");

        let plain = ToolError::bad_request("nope").to_payload();
        assert!(plain.get("details").is_none());
    }

    #[tokio::test]
    async fn test_reqwest_errors_drop_the_url() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/search?key=hunter2")
            .send()
            .await
            .unwrap_err();
        let err = ToolError::from(err);
        assert_eq!(err.kind(), "internal_error");
        assert!(!err.to_string().contains("hunter2"));
        assert!(err.to_string().starts_with("Internal error: Upstream request failed"));
    }
}
