//! CLI `doctor` command: check storage, assets and service settings.

use std::path::Path;

use anyhow::Result;

use keepsake::collage::frame::{available_frames, load_catalog};
use keepsake::config::KeepsakeConfig;
use keepsake::story::music::list_tracks;
use keepsake::story::select::list_candidates;

/// Print a readiness report for story generation.
pub fn doctor(config: &KeepsakeConfig) -> Result<()> {
    let paths = config.storage_paths();

    println!("Keepsake Health Report");
    println!("======================");
    println!();
    println!("Storage:");
    print_dir("Originals", &paths.originals);
    print_dir("Memories", &paths.memories);
    print_dir("Music", &paths.music);
    print_dir("Frames", &paths.frames);
    println!();

    let photos = list_candidates(&paths.originals).map(|c| c.len()).unwrap_or(0);
    let tracks = list_tracks(&paths.music).map(|t| t.len()).unwrap_or(0);
    println!("Content:");
    println!("  Photos:          {photos}");
    println!("  Music tracks:    {tracks}");
    if photos < config.story.min_photos.max(2) {
        println!("  WARNING: at least two photos are needed to build a story.");
    }
    println!();

    println!("Frames:");
    match load_catalog(&paths.frames_config) {
        Ok(catalog) if catalog.is_empty() => {
            println!("  Config:          none (collages are unframed)");
        }
        Ok(catalog) => {
            let usable = available_frames(&paths.frames, &catalog).len();
            println!("  Config:          {} entries", catalog.len());
            println!("  Usable:          {usable}");
        }
        Err(e) => {
            println!("  Config:          INVALID ({e})");
        }
    }
    println!();

    println!("Services:");
    println!("  Ollama:          {}", config.caption.ollama_url);
    println!("  Vision model:    {}", config.caption.vision_model);
    println!("  Caption model:   {}", config.caption.caption_model);
    match config.background.endpoint.as_deref() {
        Some(url) => println!("  Background:      {url}"),
        None => println!("  Background:      not configured (solid fallback)"),
    }

    Ok(())
}

fn print_dir(label: &str, dir: &Path) {
    let state = if dir.is_dir() { "ok" } else { "missing" };
    println!("  {:<16} {} ({state})", format!("{label}:"), dir.display());
}
