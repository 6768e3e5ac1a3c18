//! Error type for n8n API calls.

use thiserror::Error;

/// Failure of a single n8n API round trip or of client construction.
///
/// None of these are retried. The variant tells the caller where the call
/// stopped: before sending, on the wire, at the server, or while decoding.
#[derive(Debug, Error)]
pub enum N8nApiError {
    /// The server answered with a status of 400 or above. `body` is the raw
    /// response text.
    #[error("n8n API {status}: {body}")]
    Remote { status: u16, body: String },

    /// Connection, timeout, or body read failure reported by the HTTP client.
    #[error("n8n request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response whose body is not valid JSON.
    #[error("failed to parse n8n response (status {status}): {source}. body preview: {body_preview}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
        body_preview: String,
    },

    /// Invalid base URL, timeout or credential.
    #[error("invalid n8n configuration: {0}")]
    Config(String),
}

impl N8nApiError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// HTTP status of a remote rejection, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            N8nApiError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a `404 Not Found` rejection.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Collapse a response body into a single-line preview of at most `limit` bytes.
pub(crate) fn truncate_body_preview(text: &str, limit: usize) -> String {
    if text.trim().is_empty() {
        return "<empty>".to_string();
    }

    let mut preview = String::new();
    for ch in text.chars() {
        if preview.len() >= limit {
            preview.push_str("...");
            break;
        }
        match ch {
            '\n' | '\r' | '\t' => {
                if !preview.ends_with(' ') {
                    preview.push(' ');
                }
            }
            _ => preview.push(ch),
        }
    }

    preview.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_message_carries_status_and_body() {
        let error = N8nApiError::Remote {
            status: 404,
            body: r#"{"message":"Not Found"}"#.to_string(),
        };

        assert_eq!(error.to_string(), r#"n8n API 404: {"message":"Not Found"}"#);
        assert!(error.is_not_found());
        assert_eq!(N8nApiError::config("bad").status(), None);
    }

    #[test]
    fn preview_flattens_whitespace_and_truncates() {
        assert_eq!(truncate_body_preview("  \n ", 10), "<empty>");
        assert_eq!(truncate_body_preview("a\n\nb", 10), "a b");
        assert_eq!(truncate_body_preview("abcdefghij-klm", 4), "abcd...");
    }
}
