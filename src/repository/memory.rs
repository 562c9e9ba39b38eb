use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{NoteStore, StoreError};
use crate::models::Document;

/// Process-local store, used for development runs and tests.
#[derive(Default)]
pub struct MemoryNoteStore {
    users: Mutex<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn get(&self, owner: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let users = self.users.lock().await;
        Ok(users.get(owner).and_then(|notes| notes.get(id)).cloned())
    }

    async fn set(&self, owner: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        self.users
            .lock()
            .await
            .entry(owner.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn update(&self, owner: &str, id: &str, patch: Document) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        let Some(doc) = users.get_mut(owner).and_then(|notes| notes.get_mut(id)) else {
            return Ok(false);
        };
        doc.extend(patch);
        Ok(true)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        Ok(users
            .get_mut(owner)
            .and_then(|notes| notes.remove(id))
            .is_some())
    }

    async fn list(&self, owner: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .get(owner)
            .map(|notes| {
                notes
                    .iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
