//! MCP Server implementation and lifecycle management.
//!
//! The server owns the tool router (STDIO) and the tool registry (HTTP);
//! both dispatch into the same [`ToolContext`].

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;

use super::config::Config;
use super::error::Result as CoreResult;
use crate::domains::tools::{ToolContext, ToolRegistry, build_tool_router};

#[cfg(feature = "http")]
use crate::domains::tools::{ToolResult, definitions::{ValidateParams, ValidateTool}};

const INSTRUCTIONS: &str = "Date planner on a budget. Call `validate` with your bearer token to \
     confirm access, then `budgetDate` with a budget and a city or coordinates to get an itinerary.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    config: Arc<Config>,

    /// Services shared by every tool call.
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    context: Arc<ToolContext>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server wired to the live upstream services.
    pub fn new(config: Config) -> CoreResult<Self> {
        let context = ToolContext::from_config(&config)?;
        Ok(Self::with_context(config, context))
    }

    /// Create a server around an already-built tool context.
    pub fn with_context(config: Config, context: Arc<ToolContext>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(context.clone()),
            config: Arc::new(config),
            context,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools with their input schemas.
    ///
    /// The schema is given under both `input_schema` and `inputSchema` for
    /// clients that expect either spelling.
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        ToolRegistry::get_all_tools()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "input_schema": t.input_schema,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolResult<serde_json::Value> {
        ToolRegistry::new(self.context.clone())
            .call_tool(name, arguments)
            .await
    }

    /// Resolve a bearer token to the owner's phone digits.
    #[cfg(feature = "http")]
    pub fn validate_token(&self, token: &str) -> ToolResult<String> {
        ValidateTool::execute(&ValidateParams::from_token(token), &self.context)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::upstream::testing::{PLAN_REPLY, static_context};

    fn server() -> McpServer {
        McpServer::with_context(Config::default(), static_context(PLAN_REPLY))
    }

    #[test]
    fn test_list_tools_carries_both_schema_keys() {
        let tools = server().list_tools();
        assert_eq!(tools.len(), 2);
        for tool in tools {
            assert!(tool["input_schema"].is_object());
            assert_eq!(tool["input_schema"], tool["inputSchema"]);
        }
    }

    #[test]
    fn test_info_enables_tools_only() {
        let info = server().get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert!(info.capabilities.prompts.is_none());
    }

    #[test]
    fn test_live_server_builds_without_credentials() {
        assert!(McpServer::new(Config::default()).is_ok());
    }

    #[cfg(feature = "http")]
    #[tokio::test]
    async fn test_validate_token() {
        assert_eq!(server().validate_token("tok-1").unwrap(), "15551234567");
        assert_eq!(server().validate_token("nope").unwrap_err().status_code(), 401);
    }
}
