use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::models::{Document, Note};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Note ID, unique per user
    pub id: String,
    /// Note title
    pub title: String,
    /// Note content
    pub content: String,
    /// Whether the note is pinned
    pub pinned: bool,
    /// When the note was pinned, as supplied by the client
    pub pinned_at: Option<String>,
    /// ISO-8601 creation timestamp
    pub created_at: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            pinned: note.pinned,
            pinned_at: note.pinned_at,
            created_at: note.created_at,
        }
    }
}

// The request schemas below only describe the accepted bodies in the OpenAPI
// document. Bodies are parsed leniently with `parse_body`.

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    /// Note ID; generated when omitted. An existing note with this ID is replaced.
    pub id: Option<String>,
    /// Note title; defaults to "New Note" when omitted or blank
    pub title: Option<String>,
    /// Note content; defaults to "No additional text" when omitted
    pub content: Option<String>,
    /// Whether the note is pinned; defaults to false
    pub pinned: Option<bool>,
    /// When the note was pinned; stored as sent
    pub pinned_at: Option<String>,
    /// Creation timestamp; set to the current time when omitted
    pub created_at: Option<String>,
}

#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    /// New title; left unchanged when omitted
    pub title: Option<String>,
    /// New content; left unchanged when omitted
    pub content: Option<String>,
    /// New pinned flag; left unchanged when omitted
    pub pinned: Option<bool>,
    /// New pin timestamp; left unchanged when omitted
    pub pinned_at: Option<String>,
}

/// Decodes a request body into a JSON object. Empty, malformed and non-object
/// bodies all count as `{}`.
pub fn parse_body(bytes: &[u8]) -> Document {
    if bytes.is_empty() {
        return Document::new();
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!("ignoring non-object request body: {}", other);
            Document::new()
        }
        Err(e) => {
            tracing::debug!("ignoring malformed request body: {}", e);
            Document::new()
        }
    }
}
