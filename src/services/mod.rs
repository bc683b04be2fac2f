//! Capability interfaces for the external AI services the story pipeline uses.
//!
//! [`CaptionService`] describes a photo and rewrites the description into a
//! short caption; [`BackgroundImageService`] paints a collage background from a
//! prompt. Implementations report failures as [`ServiceError`]; the pipeline
//! decides how to degrade. Concrete providers are built from configuration via
//! [`create_caption_service`] and [`create_background_service`].

pub mod background;
pub mod ollama;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use image::DynamicImage;

use crate::config::{BackgroundConfig, CaptionConfig};
use crate::error::ServiceError;

/// Produces natural-language text about photos.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Describe what the image shows. `Ok(None)` means the service had nothing to say.
    async fn describe(&self, image: &Path) -> Result<Option<String>, ServiceError>;

    /// Rewrite a raw description into a one-sentence, 15-25 word caption that
    /// weaves in `date_context`.
    async fn rewrite(&self, description: &str, date_context: &str) -> Result<String, ServiceError>;
}

/// Turns a text prompt into a background image.
#[async_trait]
pub trait BackgroundImageService: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        negative_prompt: &str,
    ) -> Result<DynamicImage, ServiceError>;
}

/// Create the caption provider from config. Only Ollama is supported.
pub fn create_caption_service(
    config: &CaptionConfig,
) -> anyhow::Result<Arc<dyn CaptionService>> {
    let service = ollama::OllamaCaptioner::new(config)?;
    Ok(Arc::new(service))
}

/// Create the background provider from config.
///
/// Without a configured endpoint every request fails, which the collage
/// builder turns into the solid fallback canvas.
pub fn create_background_service(
    config: &BackgroundConfig,
    canvas: (u32, u32),
) -> anyhow::Result<Arc<dyn BackgroundImageService>> {
    let service = background::HttpBackgroundService::new(config, canvas)?;
    Ok(Arc::new(service))
}
