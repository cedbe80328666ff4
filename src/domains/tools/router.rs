//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! Each tool knows how to create its own route; this module only lists them.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::ToolContext;
use super::definitions::{BudgetDateTool, ValidateTool};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(context: Arc<ToolContext>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(ValidateTool::create_route(context.clone()))
        .with_route(BudgetDateTool::create_route(context))
}
