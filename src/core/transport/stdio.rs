//! STDIO transport implementation.
//!
//! Standard input/output transport for desktop MCP clients. Logs go to
//! stderr so stdout carries only protocol messages.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let name = server.name().to_string();
        info!(server = %name, "Ready - serving MCP over stdin/stdout");

        let running = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        let reason = running
            .waiting()
            .await
            .map_err(|e| TransportError::ServiceError(e.to_string()))?;

        info!(server = %name, ?reason, "STDIO session closed");
        Ok(())
    }
}
