pub mod rest;

use std::sync::Arc;

use axum_macros::FromRef;

use crate::{auth::IdentityVerifier, service::NoteService};

/// Shared router state. Handlers pull out the piece they need via `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub service: Arc<NoteService>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(service: NoteService, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            service: Arc::new(service),
            verifier,
        }
    }
}
