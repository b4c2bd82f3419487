//! Grayscale image pyramid with configurable scale factor and size floor.
//!
//! Level 0 converts the RGB input to `ImageF32` luma in `[0, 1]`; each further
//! level resamples the previous one by `scale_factor` with nearest-neighbour
//! sampling and clamped borders. Construction stops early once either
//! dimension would drop below `min_size`, so a pyramid may hold fewer levels
//! than requested.

mod options;

pub use options::PyramidOptions;

use crate::error::DetectError;
use crate::image::{ImageF32, ImageRgb8, ImageView, ImageViewMut};

/// One entry of the multi-resolution representation.
#[derive(Clone, Debug)]
pub struct PyramidLevel {
    /// 0 = full resolution.
    pub index: usize,
    /// Cumulative scale relative to the original image (1.0 at level 0).
    pub scale: f32,
    /// Luma plane in `[0, 1]`.
    pub image: ImageF32,
}

#[derive(Clone, Debug, Default)]
pub struct Pyramid {
    pub levels: Vec<PyramidLevel>,
}

impl Pyramid {
    /// Build a pyramid from an RGB frame using the provided options.
    ///
    /// Pure function of its inputs; the source frame is only read.
    pub fn build(frame: &ImageRgb8<'_>, options: PyramidOptions) -> Result<Self, DetectError> {
        validate(options)?;

        let mut levels = Vec::with_capacity(options.levels);
        levels.push(PyramidLevel {
            index: 0,
            scale: 1.0,
            image: convert_l0(frame),
        });

        for lvl in 1..options.levels {
            let prev = &levels[lvl - 1];
            let nw = (prev.image.w as f32 * options.scale_factor).round() as usize;
            let nh = (prev.image.h as f32 * options.scale_factor).round() as usize;
            if nw < options.min_size || nh < options.min_size {
                break;
            }
            let image = resample(&prev.image, nw, nh);
            let scale = prev.scale * options.scale_factor;
            levels.push(PyramidLevel {
                index: lvl,
                scale,
                image,
            });
        }

        log::debug!(
            "pyramid: {} levels from {}x{}",
            levels.len(),
            frame.w,
            frame.h
        );
        Ok(Self { levels })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

fn validate(options: PyramidOptions) -> Result<(), DetectError> {
    if options.levels < 1 {
        return Err(DetectError::invalid(
            "pyramid.levels",
            format!("must be >= 1, got {}", options.levels),
        ));
    }
    if !(options.scale_factor > 0.0 && options.scale_factor < 1.0) {
        return Err(DetectError::invalid(
            "pyramid.scale_factor",
            format!("must lie in (0, 1), got {}", options.scale_factor),
        ));
    }
    Ok(())
}

fn convert_l0(frame: &ImageRgb8<'_>) -> ImageF32 {
    let mut out = ImageF32::new(frame.w, frame.h);
    for y in 0..frame.h {
        let src = frame.row_rgb(y);
        let dst = out.row_mut(y);
        for (x, dst_px) in dst.iter_mut().enumerate() {
            let r = src[x * 3] as f32;
            let g = src[x * 3 + 1] as f32;
            let b = src[x * 3 + 2] as f32;
            *dst_px = (0.299 * r + 0.587 * g + 0.114 * b) / 255.0;
        }
    }
    out
}

fn resample(src: &ImageF32, nw: usize, nh: usize) -> ImageF32 {
    let mut down = ImageF32::new(nw, nh);
    let sx_step = src.w as f32 / nw as f32;
    let sy_step = src.h as f32 / nh as f32;
    for y in 0..nh {
        let sy = ((y as f32 * sy_step) as usize).min(src.h - 1);
        let src_row = src.row(sy);
        let dst_row = down.row_mut(y);
        for (x, dst_px) in dst_row.iter_mut().enumerate() {
            let sx = ((x as f32 * sx_step) as usize).min(src.w - 1);
            *dst_px = src_row[sx];
        }
    }
    down
}
