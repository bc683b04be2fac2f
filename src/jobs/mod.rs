//! Story jobs: registration, the background pipeline, and status lookups.
//!
//! [`JobOrchestrator::start`] registers a job and returns its id at once; the
//! pipeline runs on a spawned task and reports progress through the
//! [`JobStore`]. Callers only poll [`JobOrchestrator::status`].
//!
//! Stage order per job:
//! 1. list candidates and select/caption memories (fatal on failure)
//! 2. build the collage (failure is logged, the story goes on without it)
//! 3. pick music, assemble and persist the artifact (fatal on failure)

pub mod registry;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::collage::{CollageComposer, CollageSettings};
use crate::config::{KeepsakeConfig, StoragePaths};
use crate::error::StoryError;
use crate::services::{BackgroundImageService, CaptionService};
use crate::story::assemble::{collage_filename, StoryAssembler};
use crate::story::music::pick_track;
use crate::story::select::{list_candidates, MemorySelector, SelectionLimits};
use crate::story::types::{Job, JobStatus, StoryArtifact};
pub use registry::{InMemoryJobStore, JobStore};

/// Everything one job needs, shared by all jobs.
pub struct StoryPipeline {
    selector: MemorySelector,
    composer: CollageComposer,
    assembler: Arc<StoryAssembler>,
    originals: PathBuf,
    music_dir: PathBuf,
    seed: Option<u64>,
}

impl StoryPipeline {
    pub fn new(
        config: &KeepsakeConfig,
        paths: &StoragePaths,
        captions: Arc<dyn CaptionService>,
        background: Arc<dyn BackgroundImageService>,
    ) -> Self {
        Self {
            selector: MemorySelector::new(
                captions,
                paths.originals.clone(),
                SelectionLimits::from(&config.story),
                &config.caption,
            ),
            composer: CollageComposer::new(
                background,
                CollageSettings::from_config(&config.collage, &config.background),
                paths,
            ),
            assembler: Arc::new(StoryAssembler::new(&config.story, paths.memories.clone())),
            originals: paths.originals.clone(),
            music_dir: paths.music.clone(),
            seed: config.story.seed,
        }
    }

    fn job_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Drive one registered job to `complete` or `failed`.
    pub async fn execute(&self, job_id: &str, store: &dyn JobStore) {
        if let Err(e) = store.update(job_id, &mut |job| {
            job.advance(JobStatus::Processing, "Selecting photos...")
        }) {
            tracing::error!(job_id, error = %e, "could not start story job");
            return;
        }

        let mut rng = self.job_rng();
        let outcome = match self.run(job_id, store, &mut rng).await {
            Ok(artifact) => {
                tracing::info!(
                    job_id,
                    items = artifact.items.len(),
                    cover = %artifact.cover_image_url,
                    "memory story created"
                );
                store.update(job_id, &mut |job| job.complete(artifact.clone()))
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "memory story failed");
                let message = e.to_string();
                store.update(job_id, &mut |job| job.fail(message.clone()))
            }
        };
        if let Err(e) = outcome {
            tracing::error!(job_id, error = %e, "could not record job outcome");
        }
    }

    async fn run(
        &self,
        job_id: &str,
        store: &dyn JobStore,
        rng: &mut StdRng,
    ) -> Result<StoryArtifact, StoryError> {
        let originals = self.originals.clone();
        let pool = tokio::task::spawn_blocking(move || list_candidates(&originals))
            .await
            .map_err(|e| StoryError::Task(e.to_string()))??;
        let memories = self.selector.select(pool, rng).await?;

        progress(store, job_id, "Creating collage...")?;
        let collage_name = collage_filename(job_id);
        let collage_path = self.assembler.memories_dir().join(&collage_name);
        let collage = match self.composer.create(&memories, &collage_path, rng).await {
            Ok(report) => {
                tracing::info!(
                    job_id,
                    template = report.template,
                    frame = report.frame.as_deref().unwrap_or("none"),
                    fallback_background = report.fallback_background,
                    placed = report.placement.placed.len(),
                    "collage ready"
                );
                Some(collage_name)
            }
            Err(e) => {
                tracing::warn!(job_id, error = %e, "collage failed, continuing without it");
                if let Err(e) = tokio::fs::remove_file(&collage_path).await {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(job_id, error = %e, "could not remove partial collage");
                    }
                }
                None
            }
        };

        progress(store, job_id, "Finalizing...")?;
        let seed: u64 = rng.random();
        let music_dir = self.music_dir.clone();
        let assembler = Arc::clone(&self.assembler);
        let job_id = job_id.to_string();
        tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let music = pick_track(&music_dir, &mut rng);
            let artifact = assembler.build(
                &job_id,
                &memories,
                collage.as_deref(),
                music.as_deref(),
                Local::now(),
            )?;
            assembler.persist(&artifact)?;
            Ok::<_, StoryError>(artifact)
        })
        .await
        .map_err(|e| StoryError::Task(e.to_string()))?
    }
}

fn progress(store: &dyn JobStore, job_id: &str, message: &str) -> Result<(), StoryError> {
    store.update(job_id, &mut |job| {
        job.message = message.to_string();
        Ok(())
    })?;
    tracing::debug!(job_id, message, "job progress");
    Ok(())
}

/// Starts story jobs and answers status queries.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<dyn JobStore>,
    pipeline: Arc<StoryPipeline>,
}

impl JobOrchestrator {
    pub fn new(store: Arc<dyn JobStore>, pipeline: Arc<StoryPipeline>) -> Self {
        Self { store, pipeline }
    }

    /// Orchestrator with an in-memory registry over the configured storage.
    pub fn from_config(
        config: &KeepsakeConfig,
        captions: Arc<dyn CaptionService>,
        background: Arc<dyn BackgroundImageService>,
    ) -> Self {
        let paths = config.storage_paths();
        let pipeline = StoryPipeline::new(config, &paths, captions, background);
        Self::new(Arc::new(InMemoryJobStore::new()), Arc::new(pipeline))
    }

    /// Register a job and schedule its pipeline. Must be called inside a
    /// tokio runtime.
    pub fn start(&self) -> Result<String, StoryError> {
        let id = Uuid::now_v7().to_string();
        self.store.insert(Job::new(id.clone()))?;
        tracing::info!(job_id = %id, "story job queued");

        let store = Arc::clone(&self.store);
        let pipeline = Arc::clone(&self.pipeline);
        let job_id = id.clone();
        tokio::spawn(async move {
            let worker = tokio::spawn({
                let store = Arc::clone(&store);
                let job_id = job_id.clone();
                async move { pipeline.execute(&job_id, store.as_ref()).await }
            });
            if let Err(e) = worker.await {
                tracing::error!(job_id = %job_id, error = %e, "story task aborted");
                let message = format!("story task aborted: {e}");
                let recorded = store.update(&job_id, &mut |job| {
                    if job.status == JobStatus::Starting {
                        job.advance(JobStatus::Processing, "Selecting photos...")?;
                    }
                    job.fail(message.clone())
                });
                if let Err(e) = recorded {
                    tracing::error!(job_id = %job_id, error = %e, "could not record aborted job");
                }
            }
        });

        Ok(id)
    }

    pub fn status(&self, job_id: &str) -> Result<Job, StoryError> {
        self.store
            .get(job_id)?
            .ok_or_else(|| StoryError::JobNotFound(job_id.to_string()))
    }
}
