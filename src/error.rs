//! Error types for the story pipeline and its external services.

use crate::story::types::JobStatus;

/// Failures that end a story job or a job-registry operation.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("need at least two photos, found {found}")]
    NotEnoughPhotos { found: usize },

    #[error("no suitable photos found")]
    NoSuitablePhotos,

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("job already registered: {0}")]
    JobExists(String),

    #[error("job cannot move from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

/// Failures reported by caption and background providers.
///
/// These never escape the pipeline: callers degrade to fallback values.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service not configured: {0}")]
    NotConfigured(&'static str),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
