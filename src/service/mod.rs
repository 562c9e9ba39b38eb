use crate::{
    auth::UserId,
    dto::NoteResponse,
    models::{self, Document},
    repository::{NoteStore, StoreError},
};

use std::sync::Arc;

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn get_all_notes(&self, owner: &UserId) -> Result<Vec<NoteResponse>, StoreError> {
        let docs = self.store.list(owner.as_str()).await?;

        let mut notes: Vec<_> = docs
            .iter()
            .map(|(id, doc)| models::project(doc, id))
            .collect();
        notes.sort_by(models::listing_order);

        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    /// Stores the normalized body at its `id`, replacing any note already there.
    pub async fn create_note(
        &self,
        owner: &UserId,
        body: &Document,
    ) -> Result<NoteResponse, StoreError> {
        let note = models::normalize(body);

        self.store
            .set(owner.as_str(), &note.id, note.to_document())
            .await?;

        tracing::info!("user {} stored note {}", owner, note.id);

        Ok(note.into())
    }

    /// Merges the mutable fields present in `body`; `None` if the note is absent.
    pub async fn update_note(
        &self,
        owner: &UserId,
        id: &str,
        body: &Document,
    ) -> Result<Option<NoteResponse>, StoreError> {
        if self.store.get(owner.as_str(), id).await?.is_none() {
            return Ok(None);
        }

        let patch = models::update_patch(body);
        if !patch.is_empty() {
            self.store.update(owner.as_str(), id, patch).await?;
            tracing::info!("user {} updated note {}", owner, id);
        }

        Ok(self
            .store
            .get(owner.as_str(), id)
            .await?
            .map(|doc| models::project(&doc, id).into()))
    }

    /// Returns false if the note is absent.
    pub async fn delete_note(&self, owner: &UserId, id: &str) -> Result<bool, StoreError> {
        if self.store.get(owner.as_str(), id).await?.is_none() {
            return Ok(false);
        }

        let deleted = self.store.delete(owner.as_str(), id).await?;
        if deleted {
            tracing::info!("user {} deleted note {}", owner, id);
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryNoteStore;
    use serde_json::{Value, json};

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn service() -> (NoteService, Arc<MemoryNoteStore>) {
        let store = Arc::new(MemoryNoteStore::new());
        (NoteService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_then_list_round_trips() {
        let (service, _) = service();
        let alice = UserId::new("alice");

        let created = service
            .create_note(&alice, &doc(json!({"title": "T", "content": "C"})))
            .await
            .unwrap();
        let listed = service.get_all_notes(&alice).await.unwrap();

        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn create_with_same_id_overwrites() {
        let (service, _) = service();
        let alice = UserId::new("alice");

        service
            .create_note(&alice, &doc(json!({"id": "x", "title": "one"})))
            .await
            .unwrap();
        service
            .create_note(&alice, &doc(json!({"id": "x", "title": "two"})))
            .await
            .unwrap();

        let listed = service.get_all_notes(&alice).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "two");
    }

    #[tokio::test]
    async fn update_leaves_other_fields_alone() {
        let (service, _) = service();
        let alice = UserId::new("alice");
        service
            .create_note(&alice, &doc(json!({"id": "n", "title": "T"})))
            .await
            .unwrap();

        let updated = service
            .update_note(&alice, "n", &doc(json!({"content": "x", "id": "hijack"})))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, "n");
        assert_eq!(updated.title, "T");
        assert_eq!(updated.content, "x");
    }

    #[tokio::test]
    async fn update_applies_no_defaults() {
        let (service, store) = service();
        let alice = UserId::new("alice");
        service
            .create_note(&alice, &doc(json!({"id": "n", "title": "T"})))
            .await
            .unwrap();

        service
            .update_note(&alice, "n", &doc(json!({"title": "  spaced  "})))
            .await
            .unwrap();

        let stored = store.get("alice", "n").await.unwrap().unwrap();
        assert_eq!(stored["title"], json!("  spaced  "));
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_note() {
        let (service, _) = service();
        let alice = UserId::new("alice");

        assert!(
            service
                .update_note(&alice, "nope", &Document::new())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!service.delete_note(&alice, "nope").await.unwrap());
    }

    #[tokio::test]
    async fn users_do_not_see_each_other() {
        let (service, _) = service();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");
        service
            .create_note(&alice, &doc(json!({"id": "n"})))
            .await
            .unwrap();

        assert!(service.get_all_notes(&bob).await.unwrap().is_empty());
        assert!(!service.delete_note(&bob, "n").await.unwrap());
        assert_eq!(service.get_all_notes(&alice).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_projects_partial_documents() {
        let (service, store) = service();
        store
            .set("alice", "legacy", doc(json!({"title": "Old", "createdAt": "2020"})))
            .await
            .unwrap();

        let listed = service.get_all_notes(&UserId::new("alice")).await.unwrap();

        assert_eq!(listed[0].id, "legacy");
        assert_eq!(listed[0].content, models::DEFAULT_CONTENT);
        assert_eq!(listed[0].created_at, "2020");
    }
}
