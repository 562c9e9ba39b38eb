mod auth;
mod config;
mod dto;
mod handlers;
mod models;
mod repository;
mod service;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use auth::{FirebaseVerifier, IdentityVerifier, SharedSecretVerifier};
use config::{AuthConfig, StoreConfig};
use handlers::{AppState, rest};
use repository::{MemoryNoteStore, NoteStore, PostgresNoteStore};
use service::NoteService;

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    tracing::info!("Successfully loaded notes backend config");

    // Store creation and migration
    let store: Arc<dyn NoteStore> = match &cfg.store {
        StoreConfig::Postgres { database_dsn } => {
            let mut store = PostgresNoteStore::new(database_dsn).await.unwrap_or_else(|e| {
                tracing::error!("Failed to establish database connection: {e}");
                panic!("failed to establish database connection: {e}");
            });

            store.migrate().await.unwrap_or_else(|e| {
                tracing::error!("Failed to migrate database: {e}");
                panic!("failed to migrate database: {e}");
            });

            Arc::new(store)
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory note store; notes are lost on restart");
            Arc::new(MemoryNoteStore::new())
        }
    };

    // Identity verifier
    let verifier: Arc<dyn IdentityVerifier> = match &cfg.auth {
        AuthConfig::Firebase {
            project_id,
            key_fetch_timeout,
        } => {
            tracing::info!("Verifying Firebase ID tokens for project {}", project_id);
            let verifier = FirebaseVerifier::new(project_id.clone(), *key_fetch_timeout)
                .unwrap_or_else(|e| {
                    tracing::error!("Failed to build HTTP client: {e}");
                    panic!("failed to build HTTP client: {e}");
                });
            Arc::new(verifier)
        }
        AuthConfig::SharedSecret { secret } => {
            tracing::warn!("Verifying tokens with a shared secret; not for production use");
            Arc::new(SharedSecretVerifier::new(secret))
        }
    };

    // Router config
    let state = AppState::new(NoteService::new(store), verifier);
    let router = rest::router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind {}: {e}", cfg.listen_addr);
            panic!("failed to bind {}: {e}", cfg.listen_addr);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Notes backend listening on {}", addr),
        Err(e) => tracing::warn!("Listening, but local address is unavailable: {e}"),
    }

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}
