//! Candidate sampling and caption gathering.
//!
//! [`MemorySelector::select`] fixes a target count once, then draws candidates
//! uniformly without replacement. Each draw is described, filtered and
//! captioned; anything that falls through is dropped for good.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::Rng;

use super::filter::is_good_memory;
use super::types::{MemoryCandidate, SelectedMemory};
use crate::config::{CaptionConfig, StoryConfig};
use crate::error::StoryError;
use crate::services::CaptionService;

/// Photo extensions eligible for stories.
const PHOTO_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// How many memories a story may hold.
#[derive(Debug, Clone, Copy)]
pub struct SelectionLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self { min: 2, max: 5 }
    }
}

impl From<&StoryConfig> for SelectionLimits {
    fn from(config: &StoryConfig) -> Self {
        let min = config.min_photos.max(2);
        Self {
            min,
            max: config.max_photos.max(min),
        }
    }
}

/// List the photos in `originals`, sorted by file name.
pub fn list_candidates(originals: &Path) -> Result<Vec<MemoryCandidate>, StoryError> {
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(originals)? {
        let entry = entry?;
        let path = entry.path();
        let is_photo = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| PHOTO_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)));
        if !is_photo {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified: DateTime<Local> = metadata.modified()?.into();
        candidates.push(MemoryCandidate {
            filename: entry.file_name().to_string_lossy().into_owned(),
            modified,
        });
    }
    candidates.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(candidates)
}

/// Pick how many memories to aim for, uniformly in `[min, min(max, pool)]`.
pub fn target_count<R: Rng + ?Sized>(
    pool_size: usize,
    limits: SelectionLimits,
    rng: &mut R,
) -> Result<usize, StoryError> {
    if pool_size < limits.min {
        return Err(StoryError::NotEnoughPhotos { found: pool_size });
    }
    let upper = limits.max.min(pool_size).max(limits.min);
    Ok(rng.random_range(limits.min..=upper))
}

/// Chooses and captions the memories for one story.
pub struct MemorySelector {
    captions: Arc<dyn CaptionService>,
    originals: PathBuf,
    limits: SelectionLimits,
    throttle: Duration,
    fallback_caption: String,
    error_caption: String,
}

impl MemorySelector {
    pub fn new(
        captions: Arc<dyn CaptionService>,
        originals: impl Into<PathBuf>,
        limits: SelectionLimits,
        caption: &CaptionConfig,
    ) -> Self {
        Self {
            captions,
            originals: originals.into(),
            limits,
            throttle: Duration::from_millis(caption.throttle_ms),
            fallback_caption: caption.fallback_caption.clone(),
            error_caption: caption.error_caption.clone(),
        }
    }

    /// Run selection over `pool`. The result keeps selection order.
    pub async fn select(
        &self,
        mut pool: Vec<MemoryCandidate>,
        rng: &mut StdRng,
    ) -> Result<Vec<SelectedMemory>, StoryError> {
        let target = target_count(pool.len(), self.limits, rng)?;
        tracing::info!(pool = pool.len(), target, "selecting memories");

        let mut selected = Vec::with_capacity(target);
        let mut first_call = true;

        while selected.len() < target && !pool.is_empty() {
            let candidate = pool.swap_remove(rng.random_range(0..pool.len()));

            if !first_call && !self.throttle.is_zero() {
                tokio::time::sleep(self.throttle).await;
            }
            first_call = false;

            if let Some(memory) = self.caption_candidate(&candidate).await {
                selected.push(memory);
            }
        }

        if selected.is_empty() {
            return Err(StoryError::NoSuitablePhotos);
        }
        tracing::info!(selected = selected.len(), target, "selection finished");
        Ok(selected)
    }

    /// Describe, filter and caption one candidate. `None` drops it.
    async fn caption_candidate(&self, candidate: &MemoryCandidate) -> Option<SelectedMemory> {
        let path = self.originals.join(&candidate.filename);

        let description = match self.captions.describe(&path).await {
            Ok(Some(d)) => d,
            Ok(None) => {
                tracing::debug!(filename = %candidate.filename, "no description, skipping");
                return None;
            }
            Err(e) => {
                tracing::warn!(filename = %candidate.filename, error = %e, "describe failed, skipping");
                return None;
            }
        };

        if !is_good_memory(&description) {
            tracing::info!(filename = %candidate.filename, %description, "filtered out");
            return None;
        }

        let caption = match self
            .captions
            .rewrite(&description, &candidate.date_context())
            .await
        {
            Ok(text) if text.trim().is_empty() => self.fallback_caption.clone(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(filename = %candidate.filename, error = %e, "caption rewrite failed");
                self.error_caption.clone()
            }
        };

        if caption.trim().is_empty() {
            return None;
        }
        Some(SelectedMemory {
            filename: candidate.filename.clone(),
            caption,
        })
    }
}
