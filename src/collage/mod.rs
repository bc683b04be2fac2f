//! Collage composition: photos scattered over a generated background.
//!
//! [`CollageComposer::create`] runs the full step: dominant colours feed a
//! background prompt, the background service paints the canvas (or a solid
//! fallback is used), then each photo is scaled, optionally framed, tilted and
//! dropped at a rejection-sampled position. Photos that find no acceptable
//! position are left out; the collage is still written.

pub mod color;
pub mod frame;
pub mod layout;
pub mod prompt;
pub mod transform;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::{BackgroundConfig, CollageConfig, StoragePaths};
use crate::error::StoryError;
use crate::services::BackgroundImageService;
use crate::story::types::SelectedMemory;
use frame::Frame;
use layout::{Layout, LayoutRules, PlacedBox};

/// Knobs for one collage build.
#[derive(Debug, Clone)]
pub struct CollageSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub margin: u32,
    pub max_attempts: usize,
    pub max_overlap_ratio: f64,
    pub max_rotation_degrees: i32,
    pub negative_prompt: String,
    pub fallback_color: [u8; 3],
}

impl CollageSettings {
    pub fn from_config(collage: &CollageConfig, background: &BackgroundConfig) -> Self {
        Self {
            canvas_width: collage.width,
            canvas_height: collage.height,
            margin: collage.margin,
            max_attempts: collage.max_attempts,
            max_overlap_ratio: collage.max_overlap_ratio,
            max_rotation_degrees: collage.max_rotation_degrees,
            negative_prompt: background.negative_prompt.clone(),
            fallback_color: background.fallback_color,
        }
    }

    fn layout_rules(&self) -> LayoutRules {
        LayoutRules {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            margin: self.margin,
            max_attempts: self.max_attempts,
            max_overlap_ratio: self.max_overlap_ratio,
        }
    }
}

impl Default for CollageSettings {
    fn default() -> Self {
        Self::from_config(&CollageConfig::default(), &BackgroundConfig::default())
    }
}

/// What ended up on the canvas.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Placement {
    /// Filenames pasted onto the canvas, in paste order.
    pub placed: Vec<String>,
    /// Filenames left out (missing, or no position found).
    pub skipped: Vec<String>,
    #[serde(skip)]
    pub boxes: Vec<PlacedBox>,
}

/// Summary of a finished collage.
#[derive(Debug, Clone, Serialize)]
pub struct CollageReport {
    pub template: &'static str,
    pub frame: Option<String>,
    pub fallback_background: bool,
    pub placement: Placement,
}

/// Scale a provider image to the canvas, or paint the solid fallback.
pub fn prepare_canvas(background: Option<DynamicImage>, settings: &CollageSettings) -> RgbaImage {
    let (w, h) = (settings.canvas_width, settings.canvas_height);
    match background {
        Some(img) if img.width() == w && img.height() == h => img.to_rgba8(),
        Some(img) => img.resize_exact(w, h, FilterType::Lanczos3).to_rgba8(),
        None => {
            let [r, g, b] = settings.fallback_color;
            RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255]))
        }
    }
}

/// Paste the selected photos onto `canvas`.
///
/// Photos are processed in selection order. Each is downscaled to the bound
/// for this collage size, framed when a frame is given, rotated by a whole
/// number of degrees in `[-max_rotation, max_rotation]`, then placed.
pub fn compose<R: Rng + ?Sized>(
    canvas: &mut RgbaImage,
    originals: &Path,
    memories: &[SelectedMemory],
    frame: Option<&Frame>,
    settings: &CollageSettings,
    rng: &mut R,
) -> Result<Placement, StoryError> {
    let bound = layout::photo_bound(memories.len());
    let mut layout = Layout::new(settings.layout_rules());
    let mut placement = Placement::default();

    for memory in memories {
        let path = originals.join(&memory.filename);
        if !path.exists() {
            tracing::warn!(filename = %memory.filename, "photo missing, leaving it out of the collage");
            placement.skipped.push(memory.filename.clone());
            continue;
        }

        let photo = transform::fit_within(image::open(&path)?.to_rgba8(), bound);
        let photo = match frame {
            Some(frame) => frame::apply_frame(&photo, frame),
            None => photo,
        };
        let max_tilt = settings.max_rotation_degrees.abs();
        let angle = rng.random_range(-max_tilt..=max_tilt);
        let rotated = transform::rotate_expand(&photo, f64::from(angle));

        match layout.try_place(rotated.width(), rotated.height(), rng) {
            Some(placed) => {
                imageops::overlay(canvas, &rotated, placed.left, placed.top);
                placement.placed.push(memory.filename.clone());
            }
            None => {
                tracing::warn!(
                    filename = %memory.filename,
                    attempts = settings.max_attempts,
                    width = rotated.width(),
                    height = rotated.height(),
                    "no free spot for photo, leaving it out of the collage"
                );
                placement.skipped.push(memory.filename.clone());
            }
        }
    }

    placement.boxes = layout.placed().to_vec();
    Ok(placement)
}

/// Builds collage images for story jobs.
pub struct CollageComposer {
    background: Arc<dyn BackgroundImageService>,
    settings: CollageSettings,
    originals: PathBuf,
    frames_dir: PathBuf,
    frames_config: PathBuf,
}

impl CollageComposer {
    pub fn new(
        background: Arc<dyn BackgroundImageService>,
        settings: CollageSettings,
        paths: &StoragePaths,
    ) -> Self {
        Self {
            background,
            settings,
            originals: paths.originals.clone(),
            frames_dir: paths.frames.clone(),
            frames_config: paths.frames_config.clone(),
        }
    }

    /// Build the collage for `memories` and save it as PNG at `output`.
    pub async fn create(
        &self,
        memories: &[SelectedMemory],
        output: &Path,
        rng: &mut StdRng,
    ) -> Result<CollageReport, StoryError> {
        // 1. One representative colour per photo (CPU-heavy → spawn_blocking)
        let photo_paths: Vec<PathBuf> = memories
            .iter()
            .map(|m| self.originals.join(&m.filename))
            .collect();
        let colors = tokio::task::spawn_blocking(move || {
            photo_paths
                .iter()
                .map(|p| color::dominant_color(p))
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| StoryError::Task(e.to_string()))??;

        // 2. Background prompt
        let prompt = prompt::build_prompt(&colors, rng);
        tracing::info!(template = prompt.template, ?colors, "background prompt ready");
        tracing::debug!(prompt = %prompt.text, "background prompt text");

        // 3. Background image, falling back to a solid canvas
        let background = match self
            .background
            .generate(&prompt.text, &self.settings.negative_prompt)
            .await
        {
            Ok(img) => Some(img),
            Err(e) => {
                tracing::warn!(error = %e, "background generation failed, using solid fallback");
                None
            }
        };
        let fallback_background = background.is_none();

        // 4. Frame, layout and save (CPU-heavy → spawn_blocking). The child rng
        //    keeps seeded runs reproducible across the thread hop.
        let seed: u64 = rng.random();
        let settings = self.settings.clone();
        let originals = self.originals.clone();
        let frames_dir = self.frames_dir.clone();
        let frames_config = self.frames_config.clone();
        let memories = memories.to_vec();
        let output_path = output.to_path_buf();

        let (frame_name, placement) = tokio::task::spawn_blocking(move || {
            let mut rng = StdRng::seed_from_u64(seed);
            let catalog = frame::load_catalog(&frames_config)?;
            let chosen = frame::choose_frame(&frames_dir, &catalog, &mut rng)?;
            if let Some(ref f) = chosen {
                tracing::info!(frame = %f.name, "framing collage photos");
            }

            let mut canvas = prepare_canvas(background, &settings);
            let placement = compose(
                &mut canvas,
                &originals,
                &memories,
                chosen.as_ref(),
                &settings,
                &mut rng,
            )?;
            canvas.save(&output_path)?;
            Ok::<_, StoryError>((chosen.map(|f| f.name), placement))
        })
        .await
        .map_err(|e| StoryError::Task(e.to_string()))??;

        tracing::info!(
            output = %output.display(),
            placed = placement.placed.len(),
            skipped = placement.skipped.len(),
            "collage saved"
        );

        Ok(CollageReport {
            template: prompt.template,
            frame: frame_name,
            fallback_background,
            placement,
        })
    }
}
