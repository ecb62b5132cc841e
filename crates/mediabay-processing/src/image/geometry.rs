use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use serde::Serialize;

/// How large a normalized image may be. Images are never upscaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResizePolicy {
    /// Cap the longer edge at `max_edge`
    MaxEdge { max_edge: u32 },
    /// When `width * height` exceeds `max_pixels`, bring the longer edge to
    /// `target_long_edge`
    PixelArea {
        max_pixels: u64,
        target_long_edge: u32,
    },
}

impl ResizePolicy {
    /// Output dimensions, or `None` when the image is left as is.
    pub fn target_dimensions(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        let long_edge = width.max(height);
        match *self {
            ResizePolicy::MaxEdge { max_edge } => {
                (long_edge > max_edge).then(|| scale_long_edge(width, height, max_edge))
            }
            ResizePolicy::PixelArea {
                max_pixels,
                target_long_edge,
            } => {
                let area = width as u64 * height as u64;
                (area > max_pixels && long_edge > target_long_edge)
                    .then(|| scale_long_edge(width, height, target_long_edge))
            }
        }
    }

    pub fn apply(&self, img: DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        match self.target_dimensions(width, height) {
            Some((new_width, new_height)) => {
                tracing::debug!(
                    from = %format!("{}x{}", width, height),
                    to = %format!("{}x{}", new_width, new_height),
                    "Resizing image"
                );
                img.resize_exact(new_width, new_height, FilterType::Triangle)
            }
            None => img,
        }
    }
}

/// Scale so the longer edge equals `long_edge`; the shorter edge is rounded, minimum 1.
fn scale_long_edge(width: u32, height: u32, long_edge: u32) -> (u32, u32) {
    let scale = |short: u32, long: u32| -> u32 {
        ((short as f64 * long_edge as f64 / long as f64).round() as u32).max(1)
    };
    if width >= height {
        (long_edge, scale(height, width))
    } else {
        (scale(width, height), long_edge)
    }
}

/// Composite any alpha channel onto opaque white.
///
/// Images without alpha are returned untouched.
pub fn flatten_alpha(img: DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let flattened = RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    });

    DynamicImage::ImageRgb8(flattened)
}
