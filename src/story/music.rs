use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;

const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "ogg", "m4a"];

/// Audio files in `dir`, sorted by name.
pub fn list_tracks(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut tracks: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
        .filter(|name| is_audio(name))
        .collect();
    tracks.sort();
    Ok(tracks)
}

/// Pick a soundtrack from `dir` uniformly at random.
///
/// Returns `None` when the directory is missing or holds no audio files.
pub fn pick_track<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> Option<String> {
    let tracks = match list_tracks(dir) {
        Ok(tracks) => tracks,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "music directory unreadable");
            return None;
        }
    };

    let track = tracks.choose(rng).cloned();
    match &track {
        Some(name) => tracing::debug!(track = %name, pool = tracks.len(), "soundtrack chosen"),
        None => tracing::warn!(dir = %dir.display(), "no music files found"),
    }
    track
}

fn is_audio(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
}
