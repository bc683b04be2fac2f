#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, Rgba, RgbaImage};
use tempfile::TempDir;

use keepsake::config::{KeepsakeConfig, StoragePaths};
use keepsake::error::{ServiceError, StoryError};
use keepsake::jobs::{InMemoryJobStore, JobOrchestrator, JobStore, StoryPipeline};
use keepsake::services::{BackgroundImageService, CaptionService};
use keepsake::story::types::{Job, JobStatus};

/// Temp storage tree with a config pointing at it.
pub struct TestStorage {
    pub dir: TempDir,
    pub config: KeepsakeConfig,
    pub paths: StoragePaths,
}

/// Fresh storage with a small canvas and a fixed seed.
pub fn test_storage() -> TestStorage {
    let dir = TempDir::new().unwrap();
    let mut config = KeepsakeConfig::default();
    config.storage.root = dir.path().join("storage").to_string_lossy().into_owned();
    config.storage.assets_dir = dir.path().join("assets").to_string_lossy().into_owned();
    config.collage.width = 360;
    config.collage.height = 640;
    config.story.seed = Some(42);
    let paths = config.storage_paths();
    paths.ensure_dirs().unwrap();
    TestStorage { dir, config, paths }
}

/// Write a solid-colour PNG.
pub fn write_photo(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 3]) {
    let [r, g, b] = color;
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
        .save(dir.join(name))
        .unwrap();
}

/// Write `count` small photos named `p00.png`, `p01.png`, ...
pub fn write_photos(dir: &Path, count: usize) {
    for i in 0..count {
        let shade = (i * 20) as u8;
        write_photo(dir, &format!("p{i:02}.png"), 60, 45, [shade, 120, 200]);
    }
}

/// Caption service with canned answers.
pub struct FakeCaptions {
    /// Description returned for every photo; `None` means "nothing to say".
    pub description: Option<String>,
    pub fail_describe: bool,
    pub fail_rewrite: bool,
    /// Rewrite succeeds but returns an empty string.
    pub empty_rewrite: bool,
    pub describe_calls: AtomicUsize,
    pub rewrite_calls: AtomicUsize,
}

impl FakeCaptions {
    pub fn describing(description: &str) -> Self {
        Self {
            description: Some(description.to_string()),
            fail_describe: false,
            fail_rewrite: false,
            empty_rewrite: false,
            describe_calls: AtomicUsize::new(0),
            rewrite_calls: AtomicUsize::new(0),
        }
    }

    pub fn friendly() -> Self {
        Self::describing("two friends laughing on a sunny beach")
    }

    pub fn silent() -> Self {
        Self {
            description: None,
            ..Self::friendly()
        }
    }

    pub fn describes(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn rewrites(&self) -> usize {
        self.rewrite_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptionService for FakeCaptions {
    async fn describe(&self, image: &Path) -> Result<Option<String>, ServiceError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_describe {
            return Err(ServiceError::Malformed("canned describe failure".into()));
        }
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.description.as_ref().map(|d| format!("{d} ({name})")))
    }

    async fn rewrite(&self, description: &str, date_context: &str) -> Result<String, ServiceError> {
        self.rewrite_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_rewrite {
            return Err(ServiceError::Status {
                status: 500,
                body: "canned rewrite failure".into(),
            });
        }
        if self.empty_rewrite {
            return Ok(String::new());
        }
        Ok(format!("{description}, {date_context}"))
    }
}

/// Background service that always fails.
pub struct FailingBackground;

#[async_trait]
impl BackgroundImageService for FailingBackground {
    async fn generate(&self, _prompt: &str, _negative: &str) -> Result<DynamicImage, ServiceError> {
        Err(ServiceError::NotConfigured("background.endpoint"))
    }
}

/// Background service returning a solid image, recording prompts it was given.
pub struct SolidBackground {
    pub color: [u8; 3],
    pub prompts: Mutex<Vec<String>>,
}

impl SolidBackground {
    pub fn new(color: [u8; 3]) -> Self {
        Self {
            color,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl BackgroundImageService for SolidBackground {
    async fn generate(&self, prompt: &str, _negative: &str) -> Result<DynamicImage, ServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let [r, g, b] = self.color;
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            100,
            100,
            Rgba([r, g, b, 255]),
        )))
    }
}

/// In-memory store that records every status a job passes through.
#[derive(Default)]
pub struct RecordingJobStore {
    inner: InMemoryJobStore,
    history: Mutex<Vec<(String, JobStatus, String)>>,
}

impl RecordingJobStore {
    /// Distinct statuses of `id` in the order they were observed.
    pub fn statuses(&self, id: &str) -> Vec<JobStatus> {
        let mut seen: Vec<JobStatus> = Vec::new();
        for (job_id, status, _) in self.history.lock().unwrap().iter() {
            if job_id == id && seen.last() != Some(status) {
                seen.push(*status);
            }
        }
        seen
    }

    /// Every message `id` reported, in order.
    pub fn messages(&self, id: &str) -> Vec<String> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|(job_id, _, _)| job_id == id)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    fn record(&self, job: &Job) {
        self.history
            .lock()
            .unwrap()
            .push((job.id.clone(), job.status, job.message.clone()));
    }
}

impl JobStore for RecordingJobStore {
    fn insert(&self, job: Job) -> Result<(), StoryError> {
        self.record(&job);
        self.inner.insert(job)
    }

    fn get(&self, id: &str) -> Result<Option<Job>, StoryError> {
        self.inner.get(id)
    }

    fn update(
        &self,
        id: &str,
        change: &mut dyn FnMut(&mut Job) -> Result<(), StoryError>,
    ) -> Result<Job, StoryError> {
        let job = self.inner.update(id, change)?;
        self.record(&job);
        Ok(job)
    }
}

/// Orchestrator over `storage` with the given services and job store.
pub fn orchestrator(
    storage: &TestStorage,
    captions: Arc<dyn CaptionService>,
    background: Arc<dyn BackgroundImageService>,
    store: Arc<dyn JobStore>,
) -> JobOrchestrator {
    let pipeline = StoryPipeline::new(&storage.config, &storage.paths, captions, background);
    JobOrchestrator::new(store, Arc::new(pipeline))
}

/// Poll until the job reaches a terminal state.
pub async fn wait_for_terminal(orchestrator: &JobOrchestrator, id: &str) -> Job {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let job = orchestrator.status(id).unwrap();
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("job did not finish in time")
}
