use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::StoryError;

/// Representative colour of the photo at `path`, as `#rrggbb`.
pub fn dominant_color(path: &Path) -> Result<String, StoryError> {
    let img = image::open(path)?;
    Ok(average_color(&img))
}

/// Collapse the image to a single pixel and report it as `#rrggbb`.
pub fn average_color(img: &DynamicImage) -> String {
    let pixel = img.resize_exact(1, 1, FilterType::Lanczos3).to_rgb8();
    let [r, g, b] = pixel.get_pixel(0, 0).0;
    format!("#{r:02x}{g:02x}{b:02x}")
}
