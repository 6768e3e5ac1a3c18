//! Shared type definitions for the n8n MCP server.
//!
//! - [`workflow`] models the remote workflow record and the body sent back to
//!   the server on create/update.
//! - [`requests`] holds the tool request payloads together with the explicit
//!   precondition checks applied before any HTTP request is built.

pub mod requests;
pub mod workflow;

pub use requests::{
    CreateWorkflowRequest, DeleteWorkflowRequest, GetWorkflowRequest, SetActivationRequest, UpdateWorkflowRequest, ValidateRequest,
    ValidationError,
};
pub use workflow::{Workflow, WorkflowBody, WorkflowId};
