use anyhow::Result;

use keepsake::config::KeepsakeConfig;
use keepsake::story::store::list_artifacts;

/// List persisted stories, newest first.
pub fn stories(config: &KeepsakeConfig) -> Result<()> {
    let paths = config.storage_paths();
    let stories = list_artifacts(&paths.memories)?;

    if stories.is_empty() {
        println!("No stories yet. Run `keepsake generate` to create one.");
        return Ok(());
    }

    println!("{:<38} {:<28} {:>5}  COVER", "ID", "TITLE", "ITEMS");
    for story in &stories {
        println!(
            "{:<38} {:<28} {:>5}  {}",
            story.id,
            story.title,
            story.items.len(),
            story.cover_image_url
        );
    }
    println!();
    println!("{} stories", stories.len());
    Ok(())
}
