use chrono::{Local, TimeZone};
use keepsake::config::StoryConfig;
use keepsake::story::assemble::{collage_filename, StoryAssembler};
use keepsake::story::store::{list_artifacts, load_artifact};
use keepsake::story::types::{SelectedMemory, StoryItemKind};
use tempfile::TempDir;

fn memories(names: &[&str]) -> Vec<SelectedMemory> {
    names
        .iter()
        .map(|n| SelectedMemory {
            filename: n.to_string(),
            caption: format!("a moment with {n}"),
        })
        .collect()
}

#[test]
fn persisted_story_keeps_order_and_collage_cover() {
    let tmp = TempDir::new().unwrap();
    let assembler = StoryAssembler::new(&StoryConfig::default(), tmp.path());
    let now = Local.with_ymd_and_hms(2023, 8, 14, 9, 30, 0).unwrap();
    let collage = collage_filename("0190a1b2");

    let artifact = assembler
        .build(
            "0190a1b2",
            &memories(&["c.jpg", "a.jpg", "b.jpg"]),
            Some(&collage),
            None,
            now,
        )
        .unwrap();
    assembler.persist(&artifact).unwrap();

    let loaded = load_artifact(tmp.path(), "0190a1b2").unwrap();
    let urls: Vec<_> = loaded.items.iter().map(|i| i.image_url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "/original/c.jpg",
            "/original/a.jpg",
            "/original/b.jpg",
            "/memories/collage_0190a1b2.png"
        ]
    );
    assert_eq!(loaded.cover_image_url, "/memories/collage_0190a1b2.png");
    assert_eq!(loaded.title, "Memory from 14 August");
    assert_eq!(loaded, artifact);
}

#[test]
fn persisted_story_without_collage_uses_first_photo() {
    let tmp = TempDir::new().unwrap();
    let assembler = StoryAssembler::new(&StoryConfig::default(), tmp.path());

    let artifact = assembler
        .build("s1", &memories(&["x.png", "y.png"]), None, Some("song.ogg"), Local::now())
        .unwrap();
    assembler.persist(&artifact).unwrap();

    let loaded = load_artifact(tmp.path(), "s1").unwrap();
    assert!(loaded.items.iter().all(|i| i.kind == StoryItemKind::Image));
    assert_eq!(loaded.cover_image_url, loaded.items[0].image_url);
    assert_eq!(loaded.music_url.as_deref(), Some("/music/song.ogg"));
}

#[test]
fn wire_format_uses_camel_case() {
    let tmp = TempDir::new().unwrap();
    let assembler = StoryAssembler::new(&StoryConfig::default(), tmp.path());
    let artifact = assembler
        .build("w1", &memories(&["a.png", "b.png"]), None, None, Local::now())
        .unwrap();
    let path = assembler.persist(&artifact).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert!(raw["musicUrl"].is_null());
    assert_eq!(raw["coverImageUrl"], "/original/a.png");
    assert_eq!(raw["items"][1]["type"], "image");
    assert_eq!(raw["items"][1]["imageUrl"], "/original/b.png");
}

#[test]
fn listing_returns_newest_first() {
    let tmp = TempDir::new().unwrap();
    let assembler = StoryAssembler::new(&StoryConfig::default(), tmp.path());
    let ids = [
        uuid::Uuid::now_v7().to_string(),
        uuid::Uuid::now_v7().to_string(),
        uuid::Uuid::now_v7().to_string(),
    ];
    for id in &ids {
        let artifact = assembler
            .build(id, &memories(&["a.png", "b.png"]), None, None, Local::now())
            .unwrap();
        assembler.persist(&artifact).unwrap();
    }

    let listed: Vec<_> = list_artifacts(tmp.path())
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    let mut expected = ids.to_vec();
    expected.reverse();
    assert_eq!(listed, expected);
}
