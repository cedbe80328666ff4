//! Services shared by every tool call.

use std::sync::Arc;

use crate::core::config::Config;
use crate::domains::auth::TokenDirectory;
use crate::domains::itinerary::DatePlanner;

use super::ToolResult;

/// Read-only state handed to tool handlers.
///
/// Built once at startup; cloning the `Arc` around it is the only sharing.
#[derive(Clone)]
pub struct ToolContext {
    pub tokens: TokenDirectory,
    pub planner: DatePlanner,
}

impl ToolContext {
    pub fn new(tokens: TokenDirectory, planner: DatePlanner) -> Self {
        Self { tokens, planner }
    }

    /// Wire live upstream clients and the token directory from configuration.
    pub fn from_config(config: &Config) -> ToolResult<Arc<Self>> {
        Ok(Arc::new(Self::new(
            TokenDirectory::from_config(&config.auth),
            DatePlanner::from_config(config)?,
        )))
    }
}
