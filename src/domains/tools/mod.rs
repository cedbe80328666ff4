//! Tools domain module.
//!
//! Tools are the operations MCP clients can call. This server exposes two:
//! `validate` (token to phone) and `budgetDate` (itinerary planning).
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - Dynamic ToolRouter builder for STDIO transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//! - `context.rs` - Shared services handed to every tool
//! - `error.rs` - Error taxonomy shared by every domain
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define params, execute(), and http_handler()
//! 3. Export in `definitions/mod.rs`
//! 4. Add route in `router.rs` using `with_route()`
//! 5. Register in `registry.rs` for HTTP support

mod context;
pub mod definitions;
mod error;
mod registry;
pub mod router;

pub use context::ToolContext;
pub use error::{ToolError, ToolResult, ValidationIssue};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
