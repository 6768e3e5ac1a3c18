//! Structured MCP error helpers.
//!
//! Every error returned from a tool carries a JSON payload in `data` with a
//! stable `error_code`, a `category`, the human-readable `message`, the
//! request `context`, and whether the caller may reasonably try again.

use n8n_mcp_api::N8nApiError;
use n8n_mcp_types::ValidationError;
use rmcp::model::ErrorData;
use serde_json::Value;

fn build_error_data(error_code: &str, category: &str, message: &str, context: Value, retryable: bool, suggested_action: &str) -> Value {
    serde_json::json!({
        "error_code": error_code,
        "category": category,
        "message": message,
        "context": context,
        "retryable": retryable,
        "suggested_action": suggested_action,
    })
}

pub fn invalid_params_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::invalid_params(
        message.clone(),
        Some(build_error_data(error_code, "validation", &message, context, false, suggested_action)),
    )
}

pub fn not_found_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::resource_not_found(
        message.clone(),
        Some(build_error_data(error_code, "not_found", &message, context, false, suggested_action)),
    )
}

pub fn execution_error(error_code: &str, message: impl Into<String>, context: Value, retryable: bool, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::internal_error(
        message.clone(),
        Some(build_error_data(error_code, "execution", &message, context, retryable, suggested_action)),
    )
}

pub fn internal_error(error_code: &str, message: impl Into<String>, context: Value, suggested_action: &str) -> ErrorData {
    let message = message.into();
    ErrorData::internal_error(
        message.clone(),
        Some(build_error_data(error_code, "internal", &message, context, false, suggested_action)),
    )
}

/// Map a precondition failure to `invalid_params`.
pub fn validation_error(error: &ValidationError, context: Value) -> ErrorData {
    let mut context = context;
    if let Value::Object(map) = &mut context {
        map.insert("field".to_string(), Value::String(error.field().to_string()));
    }
    invalid_params_error("WORKFLOW_INPUT_INVALID", error.to_string(), context, "Correct the named field and call the tool again.")
}

/// Map an n8n API failure to an MCP error without altering its message.
///
/// A `404` becomes `resource_not_found`; every other failure is reported as
/// an execution or internal error. The message is always the error's own
/// display text, so status codes and raw response bodies reach the caller
/// verbatim.
pub fn api_error(operation: &str, error: &N8nApiError, context: Value) -> ErrorData {
    let mut context = context;
    if let Value::Object(map) = &mut context {
        map.insert("operation".to_string(), Value::String(operation.to_string()));
        if let Some(status) = error.status() {
            map.insert("status".to_string(), Value::from(status));
        }
    }

    let message = error.to_string();
    match error {
        N8nApiError::Remote { .. } if error.is_not_found() => not_found_error(
            "N8N_WORKFLOW_NOT_FOUND",
            message,
            context,
            "Call list_workflows to find a valid workflow id.",
        ),
        N8nApiError::Remote { status, .. } => execution_error(
            "N8N_API_REJECTED",
            message,
            context,
            *status >= 500,
            "Inspect the n8n response in the message before calling the tool again.",
        ),
        N8nApiError::Transport(_) => execution_error(
            "N8N_UNREACHABLE",
            message,
            context,
            true,
            "Check that N8N_BASE points at a running n8n instance.",
        ),
        N8nApiError::Decode { .. } => execution_error(
            "N8N_RESPONSE_INVALID",
            message,
            context,
            false,
            "Check that N8N_BASE points at the n8n API and not a proxy or login page.",
        ),
        N8nApiError::Config(_) => internal_error(
            "N8N_CONFIG_INVALID",
            message,
            context,
            "Fix the N8N_BASE, N8N_API_KEY or N8N_TIMEOUT_SECS settings and restart the server.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    #[test]
    fn not_found_keeps_status_and_body_in_message() {
        let error = N8nApiError::Remote {
            status: 404,
            body: "workflow not found".to_string(),
        };

        let mapped = api_error("get_workflow", &error, json!({"id": "1"}));

        assert_eq!(mapped.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert!(mapped.message.contains("404"));
        assert!(mapped.message.contains("workflow not found"));
        let data = mapped.data.expect("error data");
        assert_eq!(data["context"], json!({"id": "1", "operation": "get_workflow", "status": 404}));
        assert_eq!(data["error_code"], json!("N8N_WORKFLOW_NOT_FOUND"));
    }

    #[test]
    fn server_errors_are_flagged_retryable() {
        let error = N8nApiError::Remote {
            status: 502,
            body: "bad gateway".to_string(),
        };

        let mapped = api_error("list_workflows", &error, json!({}));

        assert_eq!(mapped.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(mapped.data.expect("error data")["retryable"], json!(true));
    }

    #[test]
    fn validation_errors_name_the_field() {
        let mapped = validation_error(&ValidationError::Blank { field: "id" }, json!({}));

        assert_eq!(mapped.code, ErrorCode::INVALID_PARAMS);
        assert_eq!(mapped.message, "id must not be blank");
        assert_eq!(mapped.data.expect("error data")["context"]["field"], json!("id"));
    }
}
