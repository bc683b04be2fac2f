//! Core story type definitions.
//!
//! Defines [`JobStatus`] and [`Job`] (the tracked unit of work),
//! [`MemoryCandidate`] and [`SelectedMemory`] (photos flowing through
//! selection), and [`StoryArtifact`] (the persisted narrative).

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::StoryError;

/// Lifecycle of a story job. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Registered, pipeline not yet running.
    Starting,
    /// Pipeline is running.
    Processing,
    /// Artifact persisted and attached as the job result.
    Complete,
    /// Pipeline gave up; `error` holds the reason.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Whether a job in this state may move to `next`.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Starting, Self::Processing)
                | (Self::Processing, Self::Complete)
                | (Self::Processing, Self::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starting" => Ok(Self::Starting),
            "processing" => Ok(Self::Processing),
            "complete" => Ok(Self::Complete),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown job status: {s}")),
        }
    }
}

/// A story generation request, tracked by id for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Human-readable progress or failure message.
    pub message: String,
    pub result: Option<StoryArtifact>,
    pub error: Option<String>,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Starting,
            message: "Queued".into(),
            result: None,
            error: None,
        }
    }

    /// Move to `next`, rejecting backward or skipped transitions.
    pub fn advance(&mut self, next: JobStatus, message: impl Into<String>) -> Result<(), StoryError> {
        if !self.status.can_advance_to(next) {
            return Err(StoryError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.message = message.into();
        Ok(())
    }

    pub fn complete(&mut self, artifact: StoryArtifact) -> Result<(), StoryError> {
        self.advance(JobStatus::Complete, "Memory story is ready")?;
        self.result = Some(artifact);
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), StoryError> {
        let error = error.into();
        self.advance(JobStatus::Failed, error.clone())?;
        self.error = Some(error);
        Ok(())
    }
}

/// A stored original eligible for selection.
#[derive(Debug, Clone)]
pub struct MemoryCandidate {
    pub filename: String,
    pub modified: DateTime<Local>,
}

impl MemoryCandidate {
    /// Date context handed to the caption rewriter, e.g. `taken 07 March, 2021`.
    pub fn date_context(&self) -> String {
        format!("taken {}", self.modified.format("%d %B, %Y"))
    }
}

/// A candidate that passed the content filter and received a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedMemory {
    pub filename: String,
    pub caption: String,
}

/// Kind of entry in a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryItemKind {
    Image,
    Collage,
}

/// One slide of a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryItem {
    #[serde(rename = "type")]
    pub kind: StoryItemKind,
    pub image_url: String,
    pub caption: String,
}

/// The persisted narrative. Written once per job id and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryArtifact {
    pub id: String,
    pub title: String,
    pub music_url: Option<String>,
    pub items: Vec<StoryItem>,
    pub cover_image_url: String,
}
