
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use axum_macros::debug_handler;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use crate::{
    auth::AuthUser,
    dto::{CreateNoteRequest, NoteResponse, UpdateNoteRequest, parse_body},
    handlers::AppState,
    service::NoteService,
};

#[derive(OpenApi)]
#[openapi(
    paths(get_all_notes, create_note, update_note, delete_note),
    components(schemas(NoteResponse, CreateNoteRequest, UpdateNoteRequest)),
    modifiers(&BearerAuth),
    security(("bearer" = [])),
    tags(
        (name = "notes", description = "Per-user notes")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl utoipa::Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/notes", get(get_all_notes).post(create_note))
        .route("/notes/{id}", put(update_note).delete(delete_note))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Response {
    (StatusCode::OK, "Notes backend is running").into_response()
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "All notes of the caller, pinned first", body = Vec<NoteResponse>),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler(state = AppState)]
pub async fn get_all_notes(
    AuthUser(user): AuthUser,
    State(service): State<Arc<NoteService>>,
) -> Response {
    match service.get_all_notes(&user).await {
        Ok(notes) => (StatusCode::OK, Json(notes)).into_response(),
        Err(e) => {
            tracing::error!("failed to get note entries: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to get all notes").into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note stored", body = NoteResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler(state = AppState)]
pub async fn create_note(
    AuthUser(user): AuthUser,
    State(service): State<Arc<NoteService>>,
    body: Bytes,
) -> Response {
    match service.create_note(&user, &parse_body(&body)).await {
        Ok(note) => (StatusCode::CREATED, Json(note)).into_response(),
        Err(e) => {
            tracing::error!("failed to create note entry: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create note").into_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteResponse),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler(state = AppState)]
pub async fn update_note(
    AuthUser(user): AuthUser,
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    match service.update_note(&user, &id, &parse_body(&body)).await {
        Ok(Some(note)) => (StatusCode::OK, Json(note)).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("failed to update note entry: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update note").into_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notes"
)]
#[debug_handler(state = AppState)]
pub async fn delete_note(
    AuthUser(user): AuthUser,
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> Response {
    match service.delete_note(&user, &id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Not found").into_response(),
        Err(e) => {
            tracing::error!("failed to delete note entry: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete note").into_response()
        }
    }
}
