//! HTTP job control surface.
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /memories/generate` | start a story job |
//! | `GET /memories/status/{task_id}` | job snapshot |
//! | `GET /memories` | persisted stories, newest first |
//! | `GET /memories/{filename}` | collage or artifact file |
//! | `GET /music/{filename}` | soundtrack |
//! | `GET /original/{filename}` | source photo |
//! | `GET /health` | liveness |

pub mod error;

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::StoragePaths;
use crate::error::StoryError;
use crate::jobs::JobOrchestrator;
use crate::story::store::list_artifacts;
use crate::story::types::{Job, StoryArtifact};
pub use error::{AppError, AppResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: JobOrchestrator,
    pub paths: Arc<StoragePaths>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/memories", get(list_stories))
        .route("/memories/generate", post(generate))
        .route("/memories/status/{task_id}", get(job_status))
        .route("/memories/{filename}", get(memory_asset))
        .route("/music/{filename}", get(music_asset))
        .route("/original/{filename}", get(original_asset))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    task_id: String,
}

async fn generate(State(state): State<AppState>) -> AppResult<Json<GenerateResponse>> {
    let task_id = state.orchestrator.start()?;
    Ok(Json(GenerateResponse { task_id }))
}

async fn job_status(
    State(state): State<AppState>,
    UrlPath(task_id): UrlPath<String>,
) -> AppResult<Json<Job>> {
    Ok(Json(state.orchestrator.status(&task_id)?))
}

async fn list_stories(State(state): State<AppState>) -> AppResult<Json<Vec<StoryArtifact>>> {
    let dir = state.paths.memories.clone();
    let stories = tokio::task::spawn_blocking(move || list_artifacts(&dir))
        .await
        .map_err(|e| StoryError::Task(e.to_string()))??;
    Ok(Json(stories))
}

async fn memory_asset(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> AppResult<Response> {
    serve_file(&state.paths.memories, &filename).await
}

async fn music_asset(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> AppResult<Response> {
    serve_file(&state.paths.music, &filename).await
}

async fn original_asset(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> AppResult<Response> {
    serve_file(&state.paths.originals, &filename).await
}

/// Reject names that could step outside the asset directory.
pub fn validate_asset_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(AppError::BadRequest(format!("invalid file name: {name}")));
    }
    Ok(())
}

/// Content type for an asset, by extension.
pub fn content_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "json" => "application/json",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

async fn serve_file(dir: &Path, name: &str) -> AppResult<Response> {
    validate_asset_name(name)?;
    let bytes = match tokio::fs::read(dir.join(name)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(name.to_string()));
        }
        Err(e) => return Err(StoryError::from(e).into()),
    };
    Ok(([(header::CONTENT_TYPE, content_type(name))], bytes).into_response())
}
