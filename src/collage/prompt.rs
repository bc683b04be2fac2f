//! Background prompt templates.
//!
//! Each template renders an abstract, photo-free background description around
//! one colour picked from the collage's photos.

use rand::seq::IndexedRandom;
use rand::Rng;

/// Colour used when no photo colours are available.
const NEUTRAL_COLOR: &str = "soft neutral";

type Template = fn(&str) -> String;

pub const TEMPLATES: [(&str, Template); 10] = [
    ("filmstrip_abstraction", filmstrip_abstraction),
    ("warm_retro_sky", warm_retro_sky),
    ("futuristic_geometry", futuristic_geometry),
    ("soft_blobs", soft_blobs),
    ("brushstrokes", brushstrokes),
    ("symbolic_shapes", symbolic_shapes),
    ("abstract_flowers", abstract_flowers),
    ("abstract_windows", abstract_windows),
    ("watercolor_texture", watercolor_texture),
    ("lines_and_splatters", lines_and_splatters),
];

fn filmstrip_abstraction(c: &str) -> String {
    format!("A minimalist abstract background, vintage 35mm filmstrip, soft gradients, {c} and pastel palette, light leaks, cinematic, fine grain, 8k.")
}

fn warm_retro_sky(c: &str) -> String {
    format!("A dreamy, retro-style abstract background, 70s sunset, warm {c} palette, smooth gradients, hazy clouds, sunburst effect, nostalgic film grain, ethereal, high resolution.")
}

fn futuristic_geometry(c: &str) -> String {
    format!("A modern, tech-style abstract background, clean layered dynamic curved and straight lines, monochrome base with sharp vibrant {c} accents, holographic elements, smooth highlights, minimalist vector art, Behance HD.")
}

fn soft_blobs(c: &str) -> String {
    format!("A serene minimalist organic background, large soft amorphous shapes like liquid ink bleeds, blended with smooth gradients in a soft {c} palette, subtle paper texture, bokeh effect, calm, high quality.")
}

fn brushstrokes(c: &str) -> String {
    format!("An artistic abstract background, modern canvas painting style, energetic broad textured brushstrokes, calligraphic linear patterns, harmonious {c} scheme, light canvas texture, balanced composition.")
}

fn symbolic_shapes(c: &str) -> String {
    format!("A clean modern graphic design background, soft gradient {c} base, simple icon-like vector shapes (thin circles, planet outlines), sparsely placed with gentle drop shadows, fine grain texture, rule of thirds.")
}

fn abstract_flowers(c: &str) -> String {
    format!("A soft pastel abstract background, delicate minimalist botanical illustrations, simple line-art flower silhouettes, smoothly blended {c} gradient, subtle grain, ethereal glow for depth.")
}

fn abstract_windows(c: &str) -> String {
    format!("A minimal architectural-style abstract background, layered framed square and rectangle shapes of varying opacities, on a smooth gradient {c} base, soft shadows, light grain, sharp highlights on edges.")
}

fn watercolor_texture(c: &str) -> String {
    format!("A beautiful watercolor-style abstract background, heavily blended textured brushstrokes in {c} palette, organic gradient transitions, visible high-quality paper grain, realistic water smudges, artistic.")
}

// Fixed palette: the colour is not used.
fn lines_and_splatters(_color: &str) -> String {
    "A minimal abstract composition, modern art style, random organic ink splatters, irregular hand-drawn stripes, on a soft off-white paper texture, limited palette of black, gold, and one accent color (teal or rust), delicate grain.".to_string()
}

/// A rendered prompt and the template it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundPrompt {
    pub template: &'static str,
    pub text: String,
}

/// Pick a template, then a colour, uniformly at random and render the prompt.
pub fn build_prompt<R: Rng + ?Sized>(colors: &[String], rng: &mut R) -> BackgroundPrompt {
    let index = rng.random_range(0..TEMPLATES.len());
    let (name, render) = TEMPLATES[index];
    let color = colors
        .choose(rng)
        .map(String::as_str)
        .unwrap_or(NEUTRAL_COLOR);
    BackgroundPrompt {
        template: name,
        text: render(color),
    }
}
