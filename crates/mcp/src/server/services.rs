//! Workflow operations behind the MCP tools.
//!
//! Each method validates its request, assembles the body the n8n API expects,
//! and issues the API calls. Failures surface as structured [`ErrorData`];
//! nothing is retried or rolled back.

use std::sync::Arc;

use n8n_mcp_api::WorkflowApi;
use n8n_mcp_types::{
    CreateWorkflowRequest, DeleteWorkflowRequest, GetWorkflowRequest, SetActivationRequest, UpdateWorkflowRequest, ValidateRequest,
    Workflow, WorkflowId,
};
use rmcp::model::ErrorData;
use serde_json::Value;
use tracing::{info, warn};

use crate::server::errors::{api_error, internal_error, validation_error};

/// Shared services for MCP tool handlers.
pub struct WorkflowServices {
    api: Arc<dyn WorkflowApi>,
}

impl std::fmt::Debug for WorkflowServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowServices").finish_non_exhaustive()
    }
}

fn validated<T: ValidateRequest>(request: &T, context: Value) -> Result<(), ErrorData> {
    request.validate().map_err(|error| validation_error(&error, context))
}

fn id_context(id: &WorkflowId) -> Value {
    serde_json::json!({ "id": id })
}

impl WorkflowServices {
    pub fn new(api: Arc<dyn WorkflowApi>) -> Self {
        Self { api }
    }

    /// Create a workflow and optionally activate it.
    ///
    /// When activation is requested the returned record is marked
    /// `active: true` locally, whatever the activation response contains. If
    /// activation fails the workflow stays created and inactive.
    pub async fn create_workflow(&self, request: &CreateWorkflowRequest) -> Result<Value, ErrorData> {
        validated(request, serde_json::json!({ "name": request.name }))?;
        info!(name = %request.name, activate = request.activate(), "creating workflow");

        let created = self
            .api
            .create_workflow(&request.to_body())
            .await
            .map_err(|error| api_error("create_workflow", &error, serde_json::json!({ "name": request.name })))?;

        if !request.activate() {
            return Ok(created.unwrap_or(Value::Null));
        }

        let mut created = created.unwrap_or(Value::Null);
        let Some(id) = WorkflowId::from_record(&created) else {
            return Err(internal_error(
                "WORKFLOW_CREATED_WITHOUT_ID",
                "n8n created the workflow but returned no id, so it could not be activated",
                serde_json::json!({ "name": request.name, "created": created }),
                "Call list_workflows to find the new workflow, then call set_activation.",
            ));
        };

        self.api.set_activation(&id, true).await.map_err(|error| {
            warn!(id = %id, error = %error, "workflow created but activation failed");
            api_error(
                "set_activation",
                &error,
                serde_json::json!({ "id": id, "created": true, "active": false }),
            )
        })?;

        if let Value::Object(record) = &mut created {
            record.insert("active".to_string(), Value::Bool(true));
        }
        Ok(created)
    }

    pub async fn get_workflow(&self, request: &GetWorkflowRequest) -> Result<Option<Value>, ErrorData> {
        validated(request, id_context(&request.id))?;
        info!(id = %request.id, "fetching workflow");
        self.api
            .get_workflow(&request.id)
            .await
            .map_err(|error| api_error("get_workflow", &error, id_context(&request.id)))
    }

    pub async fn list_workflows(&self) -> Result<Option<Value>, ErrorData> {
        info!("listing workflows");
        self.api
            .list_workflows()
            .await
            .map_err(|error| api_error("list_workflows", &error, serde_json::json!({})))
    }

    pub async fn set_activation(&self, request: &SetActivationRequest) -> Result<Option<Value>, ErrorData> {
        let context = serde_json::json!({ "id": request.id, "active": request.active });
        validated(request, context.clone())?;
        info!(id = %request.id, active = request.active, "setting workflow activation");
        self.api
            .set_activation(&request.id, request.active)
            .await
            .map_err(|error| api_error("set_activation", &error, context))
    }

    /// Apply a partial update.
    ///
    /// The current record is always fetched first; if that read fails no
    /// write is attempted.
    pub async fn update_workflow(&self, request: &UpdateWorkflowRequest) -> Result<Option<Value>, ErrorData> {
        validated(request, id_context(&request.id))?;
        info!(id = %request.id, "updating workflow");

        let current = self
            .api
            .get_workflow(&request.id)
            .await
            .map_err(|error| api_error("get_workflow", &error, id_context(&request.id)))?
            .ok_or_else(|| {
                internal_error(
                    "WORKFLOW_BASELINE_EMPTY",
                    format!("n8n returned an empty body for workflow {}", request.id),
                    id_context(&request.id),
                    "Call get_workflow to inspect the workflow before updating it.",
                )
            })?;
        let current = Workflow::from_value(current).map_err(|error| {
            internal_error(
                "WORKFLOW_BASELINE_INVALID",
                format!("workflow {} could not be read as a workflow record: {error}", request.id),
                id_context(&request.id),
                "Call get_workflow to inspect the workflow before updating it.",
            )
        })?;

        let body = request.merge_over(current);
        self.api
            .update_workflow(&request.id, &body)
            .await
            .map_err(|error| api_error("update_workflow", &error, id_context(&request.id)))
    }

    pub async fn delete_workflow(&self, request: &DeleteWorkflowRequest) -> Result<Value, ErrorData> {
        validated(request, id_context(&request.id))?;
        info!(id = %request.id, "deleting workflow");
        self.api
            .delete_workflow(&request.id)
            .await
            .map_err(|error| api_error("delete_workflow", &error, id_context(&request.id)))
    }
}
