//! Workflow records as exchanged with the n8n public API.
//!
//! The server owns the shape of nodes, connections and settings. These types
//! only name the fields this crate reads or writes and carry everything else
//! through untouched.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Identifier assigned by the n8n server.
///
/// The server hands out string identifiers, but callers are allowed to pass
/// integers as well. The value is opaque and only ever echoed back in paths.
#[derive(JsonSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum WorkflowId {
    Number(i64),
    Text(String),
}

impl WorkflowId {
    /// Read the `id` field of a server record, if it holds a usable identifier.
    pub fn from_record(record: &Value) -> Option<Self> {
        let id = record.get("id")?;
        let parsed = WorkflowId::deserialize(id).ok()?;
        (!parsed.is_blank()).then_some(parsed)
    }

    /// True when the identifier is an empty or whitespace-only string.
    pub fn is_blank(&self) -> bool {
        match self {
            WorkflowId::Number(_) => false,
            WorkflowId::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowId::Number(number) => write!(f, "{number}"),
            WorkflowId::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for WorkflowId {
    fn from(value: &str) -> Self {
        WorkflowId::Text(value.to_string())
    }
}

impl From<String> for WorkflowId {
    fn from(value: String) -> Self {
        WorkflowId::Text(value)
    }
}

impl From<i64> for WorkflowId {
    fn from(value: i64) -> Self {
        WorkflowId::Number(value)
    }
}

/// Typed view over a workflow record returned by the server.
///
/// Only the writable fields are typed. Fields that are absent or `null`
/// upstream decode to empty defaults. Everything else, `id` and `active`
/// included, lands in `extra` untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: Map<String, Value>,
    /// Tag labels. The server may answer with tag objects rather than plain
    /// strings; both are kept as-is.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Workflow {
    /// Decode a server record. Fails when the value is not a JSON object or one
    /// of the writable fields has an incompatible type.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Body sent on `POST /workflows` and `PATCH /workflows/{id}`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct WorkflowBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub nodes: Vec<Value>,
    pub connections: Map<String, Value>,
    pub settings: Map<String, Value>,
    pub tags: Vec<Value>,
}

impl WorkflowBody {
    /// Carry the writable fields of a fetched record forward unchanged.
    pub fn from_record(record: Workflow) -> Self {
        Self {
            name: record.name,
            nodes: record.nodes,
            connections: record.connections,
            settings: record.settings,
            tags: record.tags,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn workflow_id_accepts_strings_and_integers() {
        let text: WorkflowId = serde_json::from_value(json!("wf-1")).expect("string id");
        let number: WorkflowId = serde_json::from_value(json!(42)).expect("integer id");

        assert_eq!(text, WorkflowId::Text("wf-1".into()));
        assert_eq!(number, WorkflowId::Number(42));
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn from_record_skips_missing_and_blank_ids() {
        assert_eq!(WorkflowId::from_record(&json!({"id": "abc"})), Some(WorkflowId::from("abc")));
        assert_eq!(WorkflowId::from_record(&json!({"id": 7})), Some(WorkflowId::Number(7)));
        assert_eq!(WorkflowId::from_record(&json!({"id": "  "})), None);
        assert_eq!(WorkflowId::from_record(&json!({"id": null})), None);
        assert_eq!(WorkflowId::from_record(&json!({"name": "x"})), None);
    }

    #[test]
    fn workflow_defaults_missing_and_null_fields() {
        let record = Workflow::from_value(json!({
            "id": "1",
            "name": "Daily report",
            "nodes": null,
            "createdAt": "2024-01-01T00:00:00.000Z"
        }))
        .expect("decode record");

        assert!(record.nodes.is_empty());
        assert!(record.connections.is_empty());
        assert!(record.settings.is_empty());
        assert!(record.tags.is_empty());
        assert_eq!(record.extra.get("createdAt"), Some(&json!("2024-01-01T00:00:00.000Z")));
    }

    #[test]
    fn workflow_ignores_types_of_read_only_fields() {
        let record = Workflow::from_value(json!({
            "id": {"legacy": 3},
            "name": "Odd",
            "active": "yes",
            "nodes": [{"name": "A"}]
        }))
        .expect("decode record");

        assert_eq!(record.name.as_deref(), Some("Odd"));
        assert_eq!(record.extra.get("active"), Some(&json!("yes")));
        assert_eq!(record.extra.get("id"), Some(&json!({"legacy": 3})));
    }

    #[test]
    fn workflow_rejects_non_object_records() {
        assert!(Workflow::from_value(json!(["not", "a", "record"])).is_err());
    }

    #[test]
    fn body_from_record_keeps_tag_objects() {
        let record = Workflow::from_value(json!({
            "id": "1",
            "name": "Sync",
            "tags": [{"id": "t1", "name": "ops"}],
            "active": true
        }))
        .expect("decode record");

        let body = WorkflowBody::from_record(record);
        let encoded = serde_json::to_value(&body).expect("encode body");

        assert_eq!(encoded["tags"], json!([{"id": "t1", "name": "ops"}]));
        assert!(encoded.get("active").is_none());
        assert!(encoded.get("id").is_none());
    }

    #[test]
    fn body_omits_absent_name() {
        let encoded = serde_json::to_value(WorkflowBody::default()).expect("encode body");
        assert_eq!(encoded, json!({"nodes": [], "connections": {}, "settings": {}, "tags": []}));
    }
}
