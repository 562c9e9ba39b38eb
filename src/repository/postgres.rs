mod embedded {
    refinery::embed_migrations!("migrations");
}

use async_trait::async_trait;
use serde_json::Value;
use tokio_postgres::{Client, NoTls, Row};

use super::{NoteStore, StoreError};
use crate::models::Document;

/// Notes kept as JSONB documents, one row per `(owner_id, note_id)`.
pub struct PostgresNoteStore {
    client: Client,
}

impl PostgresNoteStore {
    pub async fn new(database_dsn: &str) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), StoreError> {
        let migrations_report = embedded::migrations::runner()
            .run_async(&mut self.client)
            .await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn document_of(row: &Row) -> Document {
    match row.get::<_, Value>("document") {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

#[async_trait]
impl NoteStore for PostgresNoteStore {
    async fn get(&self, owner: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = self
            .client
            .query_opt(
                "SELECT document FROM user_notes WHERE owner_id = $1 AND note_id = $2",
                &[&owner, &id],
            )
            .await?;

        Ok(row.as_ref().map(document_of))
    }

    async fn set(&self, owner: &str, id: &str, doc: Document) -> Result<(), StoreError> {
        let doc = Value::Object(doc);
        self.client
            .execute(
                "INSERT INTO user_notes (owner_id, note_id, document) VALUES ($1, $2, $3::jsonb) \
                 ON CONFLICT (owner_id, note_id) DO UPDATE SET document = EXCLUDED.document",
                &[&owner, &id, &doc],
            )
            .await?;

        Ok(())
    }

    async fn update(&self, owner: &str, id: &str, patch: Document) -> Result<bool, StoreError> {
        let patch = Value::Object(patch);
        let rows = self
            .client
            .execute(
                "UPDATE user_notes SET document = document || $3::jsonb \
                 WHERE owner_id = $1 AND note_id = $2",
                &[&owner, &id, &patch],
            )
            .await?;

        Ok(rows == 1)
    }

    async fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError> {
        let rows = self
            .client
            .execute(
                "DELETE FROM user_notes WHERE owner_id = $1 AND note_id = $2",
                &[&owner, &id],
            )
            .await?;

        Ok(rows == 1)
    }

    async fn list(&self, owner: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT note_id, document FROM user_notes WHERE owner_id = $1 ORDER BY note_id",
                &[&owner],
            )
            .await?;

        let mut vec = Vec::with_capacity(rows.len());

        for row in rows {
            vec.push((row.get("note_id"), document_of(&row)));
        }

        Ok(vec)
    }
}
