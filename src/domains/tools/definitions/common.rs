//! Result helpers shared by the tool definitions.

use rmcp::model::{CallToolResult, Content};
use serde_json::{Value, json};
use tracing::warn;

use crate::domains::tools::ToolError;

/// Tool failure as an MCP result: message as text, `{error, kind, details?}` as structured content.
pub fn error_result(err: &ToolError) -> CallToolResult {
    warn!(kind = err.kind(), "{err}");
    CallToolResult {
        content: vec![Content::text(err.to_string())],
        structured_content: Some(err.to_payload()),
        is_error: Some(true),
        meta: None,
    }
}

/// Single text block result.
pub fn success_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// `{content: [{type: "text", text}]}` body used by the HTTP transport.
pub fn text_content(text: impl Into<String>) -> Value {
    json!({
        "content": [{ "type": "text", "text": text.into() }]
    })
}
