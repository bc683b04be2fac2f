use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct KeepsakeConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub caption: CaptionConfig,
    pub background: BackgroundConfig,
    pub collage: CollageConfig,
    pub story: StoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Root holding `originals/`, `memories/` and `music/`.
    pub root: String,
    /// Holds `frames/*.png` and `frames_config.json`.
    pub assets_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptionConfig {
    pub ollama_url: String,
    pub vision_model: String,
    pub caption_model: String,
    /// Language the rewritten captions are written in.
    pub language: String,
    pub timeout_secs: u64,
    /// Fixed delay between successive describe calls.
    pub throttle_ms: u64,
    /// Used when the rewrite succeeds but comes back empty.
    pub fallback_caption: String,
    /// Used when the rewrite call itself fails.
    pub error_caption: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackgroundConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub negative_prompt: String,
    pub fallback_color: [u8; 3],
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollageConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub max_attempts: usize,
    pub max_overlap_ratio: f64,
    pub max_rotation_degrees: i32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoryConfig {
    pub min_photos: usize,
    pub max_photos: usize,
    pub title_prefix: String,
    pub collage_caption: String,
    /// Seed for every job's random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for KeepsakeConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            caption: CaptionConfig::default(),
            background: BackgroundConfig::default(),
            collage: CollageConfig::default(),
            story: StoryConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = default_keepsake_dir();
        Self {
            root: base.join("storage").to_string_lossy().into_owned(),
            assets_dir: base.join("assets").to_string_lossy().into_owned(),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".into(),
            vision_model: "llava".into(),
            caption_model: "qwen3:4b".into(),
            language: "Ukrainian".into(),
            timeout_secs: 60,
            throttle_ms: 0,
            fallback_caption: "A wonderful memory!".into(),
            error_caption: "Caption generation failed".into(),
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 120,
            negative_prompt: "low quality, blurry, text, watermark, logo, ugly".into(),
            fallback_color: [128, 0, 128],
        }
    }
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            margin: 30,
            max_attempts: 500,
            max_overlap_ratio: 0.15,
            max_rotation_degrees: 20,
        }
    }
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            min_photos: 2,
            max_photos: 5,
            title_prefix: "Memory from".into(),
            collage_caption: "Your best moments together!".into(),
            seed: None,
        }
    }
}

/// Returns `~/.keepsake/`
pub fn default_keepsake_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".keepsake")
}

/// Returns the default config file path: `~/.keepsake/config.toml`
pub fn default_config_path() -> PathBuf {
    default_keepsake_dir().join("config.toml")
}

/// Resolved on-disk locations used by the story pipeline.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    pub originals: PathBuf,
    pub memories: PathBuf,
    pub music: PathBuf,
    pub frames: PathBuf,
    pub frames_config: PathBuf,
}

impl StoragePaths {
    /// Lay out the standard directory tree under a storage root and assets dir.
    pub fn new(root: impl AsRef<Path>, assets: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let assets = assets.as_ref();
        Self {
            originals: root.join("originals"),
            memories: root.join("memories"),
            music: root.join("music"),
            frames: assets.join("frames"),
            frames_config: assets.join("frames_config.json"),
        }
    }

    /// Create every directory the pipeline reads from or writes to.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.originals, &self.memories, &self.music, &self.frames] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

impl KeepsakeConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            KeepsakeConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (KEEPSAKE_STORAGE, KEEPSAKE_LOG_LEVEL,
    /// KEEPSAKE_PORT, KEEPSAKE_OLLAMA_URL, KEEPSAKE_BACKGROUND_URL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KEEPSAKE_STORAGE") {
            self.storage.root = val;
        }
        if let Ok(val) = std::env::var("KEEPSAKE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("KEEPSAKE_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid KEEPSAKE_PORT"),
            }
        }
        if let Ok(val) = std::env::var("KEEPSAKE_OLLAMA_URL") {
            self.caption.ollama_url = val;
        }
        if let Ok(val) = std::env::var("KEEPSAKE_BACKGROUND_URL") {
            self.background.endpoint = Some(val);
        }
    }

    /// Resolve storage directories, expanding `~` if needed.
    pub fn storage_paths(&self) -> StoragePaths {
        StoragePaths::new(
            expand_tilde(&self.storage.root),
            expand_tilde(&self.storage.assets_dir),
        )
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
