use std::sync::Arc;

use n8n_mcp_types::{CreateWorkflowRequest, DeleteWorkflowRequest, GetWorkflowRequest, SetActivationRequest, UpdateWorkflowRequest};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo};
use rmcp::{ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use crate::server::errors::internal_error;
use crate::server::services::WorkflowServices;

#[derive(Clone)]
pub struct N8nMcpCore {
    tool_router: ToolRouter<Self>,
    services: Arc<WorkflowServices>,
}

#[tool_router]
impl N8nMcpCore {
    /// Create a new MCP core handler with shared service dependencies.
    pub fn new(services: Arc<WorkflowServices>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            services,
        }
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Create an n8n workflow. Input: name (must not be blank), nodes (array of node objects), optional connections (object keyed by source node name), optional settings, optional tags (entries must not be blank), optional activate (default false). Omitted connections/settings default to {} and tags to []. With activate=true the workflow is activated after creation; if activation fails the workflow remains created but inactive. Returns the created workflow record."
    )]
    async fn create_workflow(&self, param: Parameters<CreateWorkflowRequest>) -> Result<CallToolResult, ErrorData> {
        let created = self.services.create_workflow(&param.0).await?;
        render_text(&created)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "Fetch a single n8n workflow by id, including nodes, connections, settings, tags and active state."
    )]
    async fn get_workflow(&self, param: Parameters<GetWorkflowRequest>) -> Result<CallToolResult, ErrorData> {
        let workflow = self.services.get_workflow(&param.0).await?;
        render_text(&workflow)
    }

    #[tool(
        annotations(read_only_hint = true, open_world_hint = true),
        description = "List n8n workflows exactly as the n8n API returns them. Use to discover workflow ids."
    )]
    async fn list_workflows(&self) -> Result<CallToolResult, ErrorData> {
        let workflows = self.services.list_workflows().await?;
        render_text(&workflows)
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Activate (active=true) or deactivate (active=false) an n8n workflow by id. Returns the n8n response, or null when it is empty."
    )]
    async fn set_activation(&self, param: Parameters<SetActivationRequest>) -> Result<CallToolResult, ErrorData> {
        let outcome = self.services.set_activation(&param.0).await?;
        render_text(&outcome)
    }

    #[tool(
        annotations(open_world_hint = true),
        description = "Update an n8n workflow by id. Only provided fields (name, nodes, connections, settings, tags) change; a provided name or tag must not be blank; every other field keeps its stored value. The current workflow is fetched first and nothing is written if that read fails. Arrays and objects are replaced wholesale, not merged."
    )]
    async fn update_workflow(&self, param: Parameters<UpdateWorkflowRequest>) -> Result<CallToolResult, ErrorData> {
        let updated = self.services.update_workflow(&param.0).await?;
        render_text(&updated)
    }

    #[tool(
        annotations(destructive_hint = true, open_world_hint = true),
        description = "Delete an n8n workflow by id. Returns the n8n response, or {\"deleted\": true, \"id\": \"<id>\"} when n8n returns no body."
    )]
    async fn delete_workflow(&self, param: Parameters<DeleteWorkflowRequest>) -> Result<CallToolResult, ErrorData> {
        let deleted = self.services.delete_workflow(&param.0).await?;
        render_text(&deleted)
    }
}

/// Render a tool result as pretty-printed JSON text. An empty result renders as `null`.
fn render_text<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(value).map_err(|error| {
        internal_error(
            "RESULT_RENDER_FAILED",
            format!("failed to render tool result: {error}"),
            serde_json::json!({}),
            "Call the tool again; report the failure if it persists.",
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool_handler]
impl ServerHandler for N8nMcpCore {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: "n8n-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("n8n MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Manage workflows on an n8n instance.\nDISCOVERY:\n- Call list_workflows to find ids, then get_workflow for full detail.\nEDITING:\n- update_workflow changes only the fields you pass; pass the complete nodes and connections when changing graph structure.\n- create_workflow with activate=true creates then activates; on activation failure the workflow stays created and inactive.\nSTATE:\n- set_activation toggles whether triggers run.\n- delete_workflow is permanent.".to_string(),
            ),
        }
    }
}
