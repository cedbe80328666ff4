//! Budget Date MCP Server Library
//!
//! An MCP server that plans dates on a budget. A `budgetDate` call resolves
//! the location, reads current weather and nearby places, and asks a
//! generative model for an itinerary that is validated and clamped to the
//! budget before it is returned.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **auth**: bearer token to phone directory
//!   - **upstream**: geocoder, weather, places and model clients
//!   - **itinerary**: planning pipeline and model output validation
//!   - **tools**: MCP tool definitions and dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use budget_date_mcp_server::{core::McpServer, core::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config)?;
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
