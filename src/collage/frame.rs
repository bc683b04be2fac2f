//! Decorative frames drawn around collage photos.
//!
//! Frames are PNG overlays in the assets `frames/` directory. Each usable frame
//! has an entry in `frames_config.json` describing how the frame is scaled
//! relative to the photo and where the photo sits inside it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StoryError;

/// Placement parameters for one frame image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSpec {
    /// Uniform frame-to-photo scale, used unless both axis scales are set.
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub scale_x: Option<f64>,
    #[serde(default)]
    pub scale_y: Option<f64>,
    #[serde(default)]
    pub offset_x: i64,
    #[serde(default)]
    pub offset_y: i64,
}

impl FrameSpec {
    /// Frame size for a photo of `width` x `height`.
    pub fn frame_size(&self, width: u32, height: u32) -> (u32, u32) {
        let (sx, sy) = match (self.scale_x, self.scale_y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                let s = self.scale.unwrap_or(1.0);
                (s, s)
            }
        };
        // truncating, like integer pixel math
        (
            (width as f64 * sx).max(0.0) as u32,
            (height as f64 * sy).max(0.0) as u32,
        )
    }
}

/// Frame identifier (file name) to spec, as stored in `frames_config.json`.
pub type FrameCatalog = HashMap<String, FrameSpec>;

/// Read the frame catalog. A missing file means no frames are configured.
pub fn load_catalog(path: &Path) -> Result<FrameCatalog, StoryError> {
    if !path.exists() {
        return Ok(FrameCatalog::new());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// A frame picked for one collage, with its overlay already decoded.
#[derive(Debug, Clone)]
pub struct Frame {
    pub name: String,
    pub spec: FrameSpec,
    pub overlay: RgbaImage,
}

/// Frame PNGs in `dir` that have a catalog entry, sorted by name.
pub fn available_frames(dir: &Path, catalog: &FrameCatalog) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut frames: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            let is_png = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            let configured = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| catalog.contains_key(n));
            is_png && configured
        })
        .collect();
    frames.sort();
    frames
}

/// Choose one configured frame uniformly at random and decode it.
///
/// Returns `Ok(None)` when there is nothing to choose from, or when the chosen
/// frame image can't be decoded: the collage is then built unframed.
pub fn choose_frame<R: Rng + ?Sized>(
    dir: &Path,
    catalog: &FrameCatalog,
    rng: &mut R,
) -> Result<Option<Frame>, StoryError> {
    let frames = available_frames(dir, catalog);
    let Some(path) = frames.choose(rng) else {
        return Ok(None);
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let spec = catalog.get(&name).cloned().unwrap_or_default();
    let overlay = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            tracing::warn!(frame = %name, error = %e, "frame image unreadable, collage stays unframed");
            return Ok(None);
        }
    };
    Ok(Some(Frame {
        name,
        spec,
        overlay,
    }))
}

/// Put `photo` inside `frame`.
///
/// The frame is resized relative to the photo, the photo is centred (plus the
/// spec offsets) on a transparent canvas of the frame's size, and the frame is
/// alpha-composited on top. If the frame collapses to nothing the photo is
/// returned as-is.
pub fn apply_frame(photo: &RgbaImage, frame: &Frame) -> RgbaImage {
    let (fw, fh) = frame.spec.frame_size(photo.width(), photo.height());
    if fw == 0 || fh == 0 {
        tracing::warn!(frame = %frame.name, "frame scales to zero size, leaving photo unframed");
        return photo.clone();
    }
    let resized = imageops::resize(&frame.overlay, fw, fh, FilterType::Lanczos3);

    let mut canvas = RgbaImage::from_pixel(fw, fh, Rgba([0, 0, 0, 0]));
    let x = (i64::from(fw) - i64::from(photo.width())).div_euclid(2) + frame.spec.offset_x;
    let y = (i64::from(fh) - i64::from(photo.height())).div_euclid(2) + frame.spec.offset_y;
    imageops::replace(&mut canvas, photo, x, y);
    imageops::overlay(&mut canvas, &resized, 0, 0);
    canvas
}
