//! Transport layer for the MCP server.
//!
//! - **STDIO**: rmcp over stdin/stdout - feature: `stdio`
//! - **HTTP**: REST tool endpoints, validate handshake and JSON-RPC over
//!   POST - feature: `http` (the default transport when compiled in)
//!
//! Each transport handles the connection lifecycle and delegates
//! message processing to the MCP server handler.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
