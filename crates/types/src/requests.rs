//! MCP tool request payloads.
//!
//! Each payload derives [`JsonSchema`] so the tool router can advertise its
//! input shape, and implements [`ValidateRequest`] so malformed input is
//! rejected before any request reaches the server.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::workflow::{Workflow, WorkflowBody, WorkflowId};

/// Precondition failures detected before any HTTP request is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    Blank { field: &'static str },
    #[error("{field}[{index}] must not be blank")]
    BlankItem { field: &'static str, index: usize },
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Blank { field } | ValidationError::BlankItem { field, .. } => *field,
        }
    }
}

/// Explicit input checks for a tool request.
pub trait ValidateRequest {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_id(id: &WorkflowId) -> Result<(), ValidationError> {
    if id.is_blank() {
        return Err(ValidationError::Blank { field: "id" });
    }
    Ok(())
}

fn require_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Blank { field: "name" });
    }
    Ok(())
}

fn require_tags(tags: &[String]) -> Result<(), ValidationError> {
    match tags.iter().position(|tag| tag.trim().is_empty()) {
        Some(index) => Err(ValidationError::BlankItem { field: "tags", index }),
        None => Ok(()),
    }
}

fn tag_values(tags: Vec<String>) -> Vec<Value> {
    tags.into_iter().map(Value::String).collect()
}

fn node_values(nodes: Vec<Map<String, Value>>) -> Vec<Value> {
    nodes.into_iter().map(Value::Object).collect()
}

/// Parameters for `create_workflow`.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateWorkflowRequest {
    #[schemars(description = "Workflow name. Must not be blank.")]
    pub name: String,
    #[schemars(description = "Ordered node definitions. Passed to n8n verbatim.")]
    pub nodes: Vec<Map<String, Value>>,
    #[schemars(description = "Connection map between nodes, keyed by source node name. Defaults to {}.")]
    pub connections: Option<Map<String, Value>>,
    #[schemars(description = "Workflow settings object. Defaults to {}.")]
    pub settings: Option<Map<String, Value>>,
    #[schemars(description = "Tag labels. Defaults to [].")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Activate the workflow right after it is created. Defaults to false.")]
    pub activate: Option<bool>,
}

impl CreateWorkflowRequest {
    /// Whether a follow-up activation call was requested.
    pub fn activate(&self) -> bool {
        self.activate.unwrap_or(false)
    }

    /// Build the creation body, defaulting omitted optional fields to empty values.
    pub fn to_body(&self) -> WorkflowBody {
        WorkflowBody {
            name: Some(self.name.clone()),
            nodes: node_values(self.nodes.clone()),
            connections: self.connections.clone().unwrap_or_default(),
            settings: self.settings.clone().unwrap_or_default(),
            tags: tag_values(self.tags.clone().unwrap_or_default()),
        }
    }
}

impl ValidateRequest for CreateWorkflowRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_name(&self.name)?;
        if let Some(tags) = &self.tags {
            require_tags(tags)?;
        }
        Ok(())
    }
}

/// Parameters for `get_workflow`.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct GetWorkflowRequest {
    #[schemars(description = "Workflow identifier (string or integer).")]
    pub id: WorkflowId,
}

impl ValidateRequest for GetWorkflowRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)
    }
}

/// Parameters for `set_activation`.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetActivationRequest {
    #[schemars(description = "Workflow identifier (string or integer).")]
    pub id: WorkflowId,
    #[schemars(description = "true to activate, false to deactivate.")]
    pub active: bool,
}

impl ValidateRequest for SetActivationRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)
    }
}

/// Parameters for `update_workflow`.
///
/// Only the fields to change are supplied. Everything else is taken from the
/// workflow's current state on the server.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UpdateWorkflowRequest {
    #[schemars(description = "Workflow identifier (string or integer).")]
    pub id: WorkflowId,
    #[schemars(description = "New workflow name. Omit to keep the current one.")]
    pub name: Option<String>,
    #[schemars(description = "Replacement node list. Omit to keep the current nodes.")]
    pub nodes: Option<Vec<Map<String, Value>>>,
    #[schemars(description = "Replacement connection map. Omit to keep the current connections.")]
    pub connections: Option<Map<String, Value>>,
    #[schemars(description = "Replacement settings object. Omit to keep the current settings.")]
    pub settings: Option<Map<String, Value>>,
    #[schemars(description = "Replacement tag labels. Omit to keep the current tags.")]
    pub tags: Option<Vec<String>>,
}

impl UpdateWorkflowRequest {
    /// Merge the supplied fields over the fetched record.
    ///
    /// A field the caller left out keeps the record's value; a field missing
    /// from the record as well falls back to its empty default.
    pub fn merge_over(&self, current: Workflow) -> WorkflowBody {
        let mut body = WorkflowBody::from_record(current);
        if let Some(name) = &self.name {
            body.name = Some(name.clone());
        }
        if let Some(nodes) = &self.nodes {
            body.nodes = node_values(nodes.clone());
        }
        if let Some(connections) = &self.connections {
            body.connections = connections.clone();
        }
        if let Some(settings) = &self.settings {
            body.settings = settings.clone();
        }
        if let Some(tags) = &self.tags {
            body.tags = tag_values(tags.clone());
        }
        body
    }
}

impl ValidateRequest for UpdateWorkflowRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)?;
        if let Some(name) = &self.name {
            require_name(name)?;
        }
        if let Some(tags) = &self.tags {
            require_tags(tags)?;
        }
        Ok(())
    }
}

/// Parameters for `delete_workflow`.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeleteWorkflowRequest {
    #[schemars(description = "Workflow identifier (string or integer).")]
    pub id: WorkflowId,
}

impl ValidateRequest for DeleteWorkflowRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require_id(&self.id)
    }
}
