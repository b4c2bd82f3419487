//! I/O helpers for RGB frames and JSON.
//!
//! - `load_rgb_image`: read a PNG/JPEG/etc. into an owned interleaved RGB buffer.
//! - `save_grayscale_f32`: write an `ImageF32` to a grayscale PNG (debug output).
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageF32, ImageRgb8, ImageView};
use image::{GrayImage, ImageBuffer, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned interleaved RGB buffer with borrowed view conversion.
#[derive(Clone, Debug)]
pub struct RgbFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbFrame {
    /// Construct an owned RGB frame given raw interleaved bytes.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow as a read-only `ImageRgb8` view
    pub fn as_view(&self) -> ImageRgb8<'_> {
        ImageRgb8 {
            w: self.width,
            h: self.height,
            stride: self.width,
            data: &self.data,
        }
    }
}

/// Load an image from disk and convert to interleaved 8-bit RGB.
pub fn load_rgb_image(path: &Path) -> Result<RgbFrame, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgb8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(RgbFrame::new(width, height, img.into_raw()))
}

/// Write an `ImageF32` with values in [0, 1] to a grayscale PNG.
pub fn save_grayscale_f32(path: &Path, img: &ImageF32) -> Result<(), String> {
    let mut out: GrayImage = ImageBuffer::new(img.w as u32, img.h as u32);
    for y in 0..img.h {
        let row = img.row(y);
        for x in 0..img.w {
            let v = (row[x].clamp(0.0, 1.0) * 255.0).round() as u8;
            out.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Pretty-print a serializable value to a JSON file.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}
