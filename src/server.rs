//! HTTP server.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Welcome message |
//! | `POST` | `/ask/` | Answer a question using every stored document record |
//! | `POST` | `/upload/` | Store a multipart `file` upload and record it |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `OPTIONS` | any | CORS preflight, always 200 |
//!
//! # Error Contract
//!
//! Failures are returned as `{ "detail": "..." }` with status 400 (bad
//! upload), the extractor's own status for a body that cannot be parsed
//! (400/415/422), or 500 (store, filesystem, or model failure). Internal
//! failures are logged before they are returned.
//!
//! # CORS
//!
//! Any origin, method, and header is allowed, with credentials. Origin and
//! headers are mirrored from the request because browsers refuse a literal
//! `*` when credentials are allowed. Every `OPTIONS` request is answered by
//! the CORS layer itself, whether or not a route matches the path.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::ask;
use crate::config::Config;
use crate::intake::{self, SafeFilename};
use crate::llm::{ChatModel, OllamaChat};
use crate::store::{self, DocumentStore};

pub const WELCOME_MESSAGE: &str = "Welcome to the MediStruct API";
pub const UPLOAD_MESSAGE: &str = "File uploaded and recorded in the document graph";

/// Shared state handed to every route handler.
///
/// The store and model are injected here instead of living in globals, so
/// tests can run the real router against [`store::InMemoryStore`] and a fake
/// [`ChatModel`].
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub model: Arc<dyn ChatModel>,
    pub upload_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn ChatModel>,
        upload_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            model,
            upload_dir: Arc::new(upload_dir.into()),
        }
    }
}

/// Build the router with all routes, CORS, and no body size limit.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/ask/", post(handle_ask))
        .route("/upload/", post(handle_upload))
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Connect to the configured store and model, then serve until killed.
///
/// The store connection is made before binding. If the database is
/// unreachable this returns an error and no request is ever served.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = store::connect(&config.store).await?;
    let model: Arc<dyn ChatModel> = Arc::new(OllamaChat::new(&config.llm));

    tokio::fs::create_dir_all(&config.uploads.dir).await?;

    let state = AppState::new(store, model, config.uploads.dir.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        bind = %config.server.bind,
        model = %config.llm.model,
        uploads = %config.uploads.dir.display(),
        "MediStruct listening on http://{}",
        config.server.bind
    );

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

fn bad_request(detail: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        detail: detail.into(),
    }
}

fn internal(detail: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        detail: detail.into(),
    }
}

// ============ GET / ============

#[derive(Serialize)]
struct RootResponse {
    message: String,
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ask/ ============

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    response: String,
}

/// Handler for `POST /ask/`.
///
/// An empty store is a normal 200 with the fixed no-documents reply. Any
/// store or model failure becomes a 500.
async fn handle_ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(req) = payload?;
    let answer = ask::answer_question(state.store.as_ref(), state.model.as_ref(), &req.question)
        .await
        .map_err(|e| {
            tracing::error!(error = %format!("{:#}", e), "question answering failed");
            internal(format!("Internal error: {:#}", e))
        })?;

    Ok(Json(AskResponse {
        response: answer.into_text(),
    }))
}

// ============ POST /upload/ ============

#[derive(Serialize)]
struct UploadResponse {
    filename: String,
    message: String,
}

/// Handler for `POST /upload/`.
///
/// Reads the first multipart field named `file`. Other fields are skipped.
async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let raw_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| bad_request("upload part 'file' has no filename"))?;
        let filename = SafeFilename::parse(&raw_name).map_err(|e| {
            tracing::warn!(filename = %raw_name.escape_debug(), "rejected upload filename");
            bad_request(e.to_string())
        })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request(format!("failed to read upload body: {}", e)))?;

        let record = intake::store_upload(
            state.store.as_ref(),
            state.upload_dir.as_path(),
            &filename,
            &bytes,
        )
        .await
        .map_err(|e| {
            tracing::error!(filename = %filename, error = %format!("{:#}", e), "upload failed");
            internal("Error saving the upload")
        })?;

        return Ok(Json(UploadResponse {
            filename: record.name,
            message: UPLOAD_MESSAGE.to_string(),
        }));
    }

    Err(bad_request("multipart body has no 'file' field"))
}

// ============ fallback ============

async fn handle_not_found() -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        detail: "Not Found".to_string(),
    }
}
