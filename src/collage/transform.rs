use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Downscale to fit inside a `bound` x `bound` square, keeping aspect ratio.
/// Images already inside the bound are returned unchanged.
pub fn fit_within(img: RgbaImage, bound: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w <= bound && h <= bound {
        return img;
    }
    let scale = f64::min(bound as f64 / w as f64, bound as f64 / h as f64);
    let nw = ((w as f64 * scale).round() as u32).clamp(1, bound);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, bound);
    imageops::resize(&img, nw, nh, FilterType::Lanczos3)
}

/// Rotate counter-clockwise by `degrees`, growing the canvas so no corner is
/// clipped. Uncovered pixels are transparent.
pub fn rotate_expand(img: &RgbaImage, degrees: f64) -> RgbaImage {
    if degrees.rem_euclid(360.0) == 0.0 {
        return img.clone();
    }
    let (w, h) = img.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (wf, hf) = (w as f64, h as f64);
    // shave float noise so exact quarter turns don't gain a pixel
    let span = |v: f64| ((v - 1e-6).ceil() as u32).max(1);
    let out_w = span(wf * cos.abs() + hf * sin.abs());
    let out_h = span(wf * sin.abs() + hf * cos.abs());

    let (cx, cy) = (wf / 2.0, hf / 2.0);
    let (ocx, ocy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);

    RgbaImage::from_fn(out_w, out_h, |x, y| {
        let dx = x as f64 + 0.5 - ocx;
        let dy = y as f64 + 0.5 - ocy;
        // inverse of a counter-clockwise turn in y-down coordinates
        let sx = cos * dx - sin * dy + cx - 0.5;
        let sy = sin * dx + cos * dy + cy - 0.5;
        sample_bilinear(img, sx, sy)
    })
}

/// Premultiplied bilinear sample; out-of-bounds neighbours count as transparent.
fn sample_bilinear(img: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f64; 4];
    for (ox, oy, weight) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        if weight == 0.0 {
            continue;
        }
        let (px, py) = (x0 + ox, y0 + oy);
        if px < 0 || py < 0 || px >= img.width() as i64 || py >= img.height() as i64 {
            continue;
        }
        let p = img.get_pixel(px as u32, py as u32).0;
        let a = p[3] as f64 / 255.0 * weight;
        acc[0] += p[0] as f64 * a;
        acc[1] += p[1] as f64 * a;
        acc[2] += p[2] as f64 * a;
        acc[3] += a;
    }

    if acc[3] <= f64::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremul = |c: f64| (c / acc[3]).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremul(acc[0]),
        unpremul(acc[1]),
        unpremul(acc[2]),
        (acc[3] * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
