//! MCP server over process stdin/stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;

use crate::server::core::N8nMcpCore;
use crate::server::services::WorkflowServices;

/// Serve the workflow tools on stdio until the client disconnects.
///
/// stdout carries protocol frames only; logging must go elsewhere.
pub async fn serve_stdio(services: Arc<WorkflowServices>) -> Result<()> {
    info!("MCP stdio server starting");
    let running = N8nMcpCore::new(services)
        .serve(stdio())
        .await
        .context("failed to initialize MCP stdio session")?;
    let reason = running.waiting().await.context("MCP stdio session task failed")?;
    info!(reason = ?reason, "MCP stdio server stopped");
    Ok(())
}
