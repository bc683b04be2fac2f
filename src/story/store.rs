//! Persisted story artifacts: one pretty-printed JSON file per job id.

use std::path::{Path, PathBuf};

use super::types::StoryArtifact;
use crate::error::StoryError;

pub fn artifact_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
}

/// Write the artifact atomically (tmp + rename). Returns the final path.
pub fn save_artifact(dir: &Path, artifact: &StoryArtifact) -> Result<PathBuf, StoryError> {
    let path = artifact_path(dir, &artifact.id);
    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(artifact)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, &path)?;
    tracing::debug!(path = %path.display(), "artifact written");
    Ok(path)
}

pub fn load_artifact(dir: &Path, id: &str) -> Result<StoryArtifact, StoryError> {
    let contents = std::fs::read_to_string(artifact_path(dir, id))?;
    Ok(serde_json::from_str(&contents)?)
}

/// All readable artifacts in `dir`, most recent first.
///
/// Job ids are time-ordered, so reverse file-name order is recency order.
/// Files that fail to parse are skipped with a warning.
pub fn list_artifacts(dir: &Path) -> Result<Vec<StoryArtifact>, StoryError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    let mut artifacts = Vec::with_capacity(files.len());
    for path in files {
        let parsed = std::fs::read_to_string(&path)
            .map_err(StoryError::from)
            .and_then(|s| serde_json::from_str::<StoryArtifact>(&s).map_err(StoryError::from));
        match parsed {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable artifact");
            }
        }
    }
    Ok(artifacts)
}
