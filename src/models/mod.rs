mod normalize;
mod ordering;

pub use normalize::{normalize, project};
pub use ordering::listing_order;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

/// Raw stored note document: a flat JSON object that may be missing fields.
pub type Document = Map<String, Value>;

pub const DEFAULT_TITLE: &str = "New Note";
pub const DEFAULT_CONTENT: &str = "No additional text";

/// Fields a client may change through a partial update.
pub const MUTABLE_FIELDS: [&str; 4] = ["title", "content", "pinned", "pinnedAt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub pinned_at: Option<String>,
    pub created_at: String,
}

impl Note {
    /// Flat document in the persisted field layout.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("id".to_string(), Value::from(self.id.clone()));
        doc.insert("title".to_string(), Value::from(self.title.clone()));
        doc.insert("content".to_string(), Value::from(self.content.clone()));
        doc.insert("pinned".to_string(), Value::from(self.pinned));
        doc.insert("pinnedAt".to_string(), Value::from(self.pinned_at.clone()));
        doc.insert("createdAt".to_string(), Value::from(self.created_at.clone()));
        doc
    }
}

/// Subset of `body` limited to the client-mutable fields, values kept as sent.
pub fn update_patch(body: &Document) -> Document {
    MUTABLE_FIELDS
        .iter()
        .filter_map(|&key| body.get(key).map(|v| (key.to_string(), v.clone())))
        .collect()
}

pub(crate) fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
