//! Story artifact assembly.
//!
//! Turns the selected memories, the optional collage and the optional
//! soundtrack into a [`StoryArtifact`] and writes it under the memories
//! directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::store;
use super::types::{SelectedMemory, StoryArtifact, StoryItem, StoryItemKind};
use crate::config::StoryConfig;
use crate::error::StoryError;

/// File name of the collage image for `job_id`.
pub fn collage_filename(job_id: &str) -> String {
    format!("collage_{job_id}.png")
}

pub fn original_url(filename: &str) -> String {
    format!("/original/{filename}")
}

pub fn memory_url(filename: &str) -> String {
    format!("/memories/{filename}")
}

pub fn music_url(filename: &str) -> String {
    format!("/music/{filename}")
}

pub struct StoryAssembler {
    title_prefix: String,
    collage_caption: String,
    memories_dir: PathBuf,
}

impl StoryAssembler {
    pub fn new(config: &StoryConfig, memories_dir: impl Into<PathBuf>) -> Self {
        Self {
            title_prefix: config.title_prefix.clone(),
            collage_caption: config.collage_caption.clone(),
            memories_dir: memories_dir.into(),
        }
    }

    pub fn memories_dir(&self) -> &Path {
        &self.memories_dir
    }

    /// Build the artifact for a job.
    ///
    /// One image item per memory in selection order, then a collage item when
    /// `collage` names the written collage file. The cover is the collage if
    /// there is one, else the first memory.
    pub fn build(
        &self,
        job_id: &str,
        memories: &[SelectedMemory],
        collage: Option<&str>,
        music: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<StoryArtifact, StoryError> {
        let first = memories.first().ok_or(StoryError::NoSuitablePhotos)?;

        let mut items: Vec<StoryItem> = memories
            .iter()
            .map(|m| StoryItem {
                kind: StoryItemKind::Image,
                image_url: original_url(&m.filename),
                caption: m.caption.clone(),
            })
            .collect();

        let cover_image_url = match collage {
            Some(file) => {
                let url = memory_url(file);
                items.push(StoryItem {
                    kind: StoryItemKind::Collage,
                    image_url: url.clone(),
                    caption: self.collage_caption.clone(),
                });
                url
            }
            None => original_url(&first.filename),
        };

        Ok(StoryArtifact {
            id: job_id.to_string(),
            title: format!("{} {}", self.title_prefix, now.format("%d %B")),
            music_url: music.map(music_url),
            items,
            cover_image_url,
        })
    }

    /// Write `artifact` to `{memories}/{id}.json`.
    pub fn persist(&self, artifact: &StoryArtifact) -> Result<PathBuf, StoryError> {
        store::save_artifact(&self.memories_dir, artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assembler() -> StoryAssembler {
        StoryAssembler::new(&StoryConfig::default(), "/tmp/unused")
    }

    fn memories() -> Vec<SelectedMemory> {
        vec![
            SelectedMemory {
                filename: "beach.jpg".into(),
                caption: "Sun and sand".into(),
            },
            SelectedMemory {
                filename: "hike.png".into(),
                caption: "Up the hill".into(),
            },
        ]
    }

    fn may_day() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn collage_goes_last_and_becomes_cover() {
        let collage = collage_filename("job1");
        let artifact = assembler()
            .build("job1", &memories(), Some(&collage), Some("song.mp3"), may_day())
            .unwrap();

        let kinds: Vec<_> = artifact.items.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![StoryItemKind::Image, StoryItemKind::Image, StoryItemKind::Collage]
        );
        assert_eq!(artifact.items[0].image_url, "/original/beach.jpg");
        assert_eq!(artifact.cover_image_url, "/memories/collage_job1.png");
        assert_eq!(artifact.items[2].caption, StoryConfig::default().collage_caption);
        assert_eq!(artifact.music_url.as_deref(), Some("/music/song.mp3"));
    }

    #[test]
    fn without_collage_cover_is_first_photo() {
        let artifact = assembler()
            .build("job2", &memories(), None, None, may_day())
            .unwrap();
        assert_eq!(artifact.items.len(), 2);
        assert_eq!(artifact.cover_image_url, "/original/beach.jpg");
        assert!(artifact.music_url.is_none());
    }

    #[test]
    fn title_uses_day_and_month() {
        let artifact = assembler()
            .build("job3", &memories(), None, None, may_day())
            .unwrap();
        assert_eq!(artifact.title, "Memory from 01 May");
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = assembler().build("job4", &[], None, None, may_day()).unwrap_err();
        assert!(matches!(err, StoryError::NoSuitablePhotos));
    }
}
