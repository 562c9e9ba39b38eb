use serde_json::Value;
use uuid::Uuid;

use super::{DEFAULT_CONTENT, DEFAULT_TITLE, Document, Note, now_iso};

/// Builds a complete note from a client-supplied, possibly partial body.
pub fn normalize(body: &Document) -> Note {
    let id = non_empty_str(body.get("id"))
        .map_or_else(|| Uuid::new_v4().simple().to_string(), str::to_string);

    let title = body
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let content = body
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CONTENT)
        .to_string();

    let created_at =
        non_empty_str(body.get("createdAt")).map_or_else(now_iso, str::to_string);

    Note {
        id,
        title,
        content,
        pinned: body.get("pinned").is_some_and(truthy),
        pinned_at: body.get("pinnedAt").and_then(Value::as_str).map(str::to_string),
        created_at,
    }
}

/// Canonical view of a stored document. `storage_id` is the key the document
/// lives under and stands in for a missing `id` field.
pub fn project(doc: &Document, storage_id: &str) -> Note {
    Note {
        id: non_empty_str(doc.get("id")).unwrap_or(storage_id).to_string(),
        title: doc
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string(),
        content: doc
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CONTENT)
            .to_string(),
        pinned: doc.get("pinned").is_some_and(truthy),
        pinned_at: doc.get("pinnedAt").and_then(Value::as_str).map(str::to_string),
        created_at: doc
            .get("createdAt")
            .and_then(Value::as_str)
            .map_or_else(now_iso, str::to_string),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
