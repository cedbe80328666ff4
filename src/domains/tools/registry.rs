//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use super::ToolContext;
use super::definitions::{BudgetDateTool, ValidateTool};
#[cfg(feature = "http")]
use super::{ToolError, ToolResult};

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    context: Arc<ToolContext>,
}

impl ToolRegistry {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![ValidateTool::NAME, BudgetDateTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// Single source of truth for tool metadata on every transport.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![ValidateTool::to_tool(), BudgetDateTool::to_tool()]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> ToolResult<serde_json::Value> {
        match name {
            ValidateTool::NAME => ValidateTool::http_handler(arguments, self.context.clone()).await,
            BudgetDateTool::NAME => {
                BudgetDateTool::http_handler(arguments, self.context.clone()).await
            }
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
