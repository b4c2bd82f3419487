//! Per-region feature descriptors across four families.
//!
//! Every candidate region gets a fixed-shape [`FeatureVector`] computed from
//! the full-resolution frame: geometry of the box itself, texture statistics
//! from the gradient field, dominant color statistics from the RGB pixels, and
//! structural cues (perimeter edge coverage, border contrast, mirror
//! symmetry). The same region over the same pixels always yields the same
//! vector, which makes the per-region cache sound.
//!
//! The extractor-local cache is keyed by a Sha256 fingerprint of the bbox and
//! the ROI pixel bytes. It is independent from the whole-frame result cache.

use crate::cache::{Fingerprint, LruMap};
use crate::edges::EdgeMap;
use crate::error::DetectError;
use crate::image::{ImageF32, ImageRgb8, ImageView};
use crate::segment::Region;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Box geometry features.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometricFeatures {
    pub width: f32,
    pub height: f32,
    pub aspect_ratio: f32,
    /// Fraction of ROI pixels that differ from the border background.
    pub fill_ratio: f32,
}

/// Local texture summary over the ROI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureFeatures {
    /// Fraction of ROI pixels flagged by the edge detector.
    pub edge_density: f32,
    pub gradient_mean: f32,
    pub gradient_variance: f32,
}

/// Dominant color statistics over the ROI (0–255 scale).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorFeatures {
    pub mean: [f32; 3],
    pub std: [f32; 3],
    /// HSV-style saturation mean: `255 * (max - min) / max` per pixel.
    pub saturation_mean: f32,
    /// HSV-style value mean: max channel per pixel.
    pub brightness_mean: f32,
}

/// Structural cues indicating rectangularity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralFeatures {
    /// Fraction of bbox perimeter pixels covered by edges.
    pub rectangularity: f32,
    /// Mean gradient magnitude along the bbox perimeter, clamped to [0, 1].
    pub border_contrast: f32,
    /// Horizontal mirror similarity of the gradient field, in [0, 1].
    pub symmetry: f32,
}

/// Fixed-shape descriptor for one candidate region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVector {
    pub geometric: GeometricFeatures,
    pub texture: TextureFeatures,
    pub color: ColorFeatures,
    pub structural: StructuralFeatures,
}

/// Computes feature vectors, memoizing by region fingerprint.
pub struct FeatureExtractor {
    cache: Option<Mutex<LruMap<Fingerprint, FeatureVector>>>,
}

impl FeatureExtractor {
    /// `cache_size` of zero (or `enable_caching = false` upstream) disables
    /// the per-region cache entirely.
    pub fn new(enable_caching: bool, cache_size: usize) -> Self {
        let cache = (enable_caching && cache_size > 0)
            .then(|| Mutex::new(LruMap::new(cache_size)));
        Self { cache }
    }

    /// Extract the descriptor for `region` from the full-resolution frame.
    ///
    /// `gray` and `edges` must be the level-0 luma plane and edge map of the
    /// same frame. Fails only on a region that degenerates to zero area after
    /// clamping to the frame bounds.
    pub fn extract(
        &self,
        frame: &ImageRgb8<'_>,
        gray: &ImageF32,
        edges: &EdgeMap,
        region: &Region,
    ) -> Result<FeatureVector, DetectError> {
        let roi = match clamp_roi(region, frame.w, frame.h) {
            Some(roi) => roi,
            None => {
                return Err(DetectError::FeatureExtraction {
                    bbox: (
                        region.bbox.x,
                        region.bbox.y,
                        region.bbox.w,
                        region.bbox.h,
                    ),
                    message: "region has zero area inside the frame".into(),
                })
            }
        };

        let fingerprint = self
            .cache
            .as_ref()
            .map(|_| region_fingerprint(frame, &roi));
        if let (Some(cache), Some(fp)) = (&self.cache, &fingerprint) {
            if let Some(cached) = cache.lock().get(fp) {
                return Ok(*cached);
            }
        }

        let vector = FeatureVector {
            geometric: geometric_features(gray, &roi),
            texture: texture_features(edges, &roi),
            color: color_features(frame, &roi),
            structural: structural_features(edges, &roi),
        };

        if let (Some(cache), Some(fp)) = (&self.cache, fingerprint) {
            cache.lock().insert(fp, vector);
        }
        Ok(vector)
    }

    /// Number of entries currently memoized.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.lock().len())
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }
}

/// ROI clamped to frame bounds, guaranteed non-empty.
struct Roi {
    x: usize,
    y: usize,
    w: usize,
    h: usize,
}

fn clamp_roi(region: &Region, frame_w: usize, frame_h: usize) -> Option<Roi> {
    let x = region.bbox.x as usize;
    let y = region.bbox.y as usize;
    if x >= frame_w || y >= frame_h {
        return None;
    }
    let w = (region.bbox.w as usize).min(frame_w - x);
    let h = (region.bbox.h as usize).min(frame_h - y);
    if w == 0 || h == 0 {
        return None;
    }
    Some(Roi { x, y, w, h })
}

fn region_fingerprint(frame: &ImageRgb8<'_>, roi: &Roi) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update((roi.x as u64).to_le_bytes());
    hasher.update((roi.y as u64).to_le_bytes());
    hasher.update((roi.w as u64).to_le_bytes());
    hasher.update((roi.h as u64).to_le_bytes());
    for y in roi.y..roi.y + roi.h {
        let row = frame.row_rgb(y);
        hasher.update(&row[roi.x * 3..(roi.x + roi.w) * 3]);
    }
    hasher.finalize().into()
}

fn geometric_features(gray: &ImageF32, roi: &Roi) -> GeometricFeatures {
    // Background estimate: mean luma along a ring one pixel outside the bbox
    // (clamped at the frame border). Foreground is whatever stands out from it.
    let x_out0 = roi.x.saturating_sub(1);
    let y_out0 = roi.y.saturating_sub(1);
    let x_out1 = (roi.x + roi.w).min(gray.w - 1);
    let y_out1 = (roi.y + roi.h).min(gray.h - 1);
    let mut border_sum = 0.0f32;
    let mut border_n = 0usize;
    for x in x_out0..=x_out1 {
        border_sum += gray.get(x, y_out0) + gray.get(x, y_out1);
        border_n += 2;
    }
    for y in y_out0..=y_out1 {
        border_sum += gray.get(x_out0, y) + gray.get(x_out1, y);
        border_n += 2;
    }
    let border_mean = border_sum / border_n.max(1) as f32;

    const CONTRAST_FLOOR: f32 = 0.08;
    let mut foreground = 0usize;
    for y in roi.y..roi.y + roi.h {
        let row = gray.row(y);
        for x in roi.x..roi.x + roi.w {
            if (row[x] - border_mean).abs() > CONTRAST_FLOOR {
                foreground += 1;
            }
        }
    }

    GeometricFeatures {
        width: roi.w as f32,
        height: roi.h as f32,
        aspect_ratio: roi.w as f32 / roi.h as f32,
        fill_ratio: foreground as f32 / (roi.w * roi.h) as f32,
    }
}

fn texture_features(edges: &EdgeMap, roi: &Roi) -> TextureFeatures {
    let x1 = (roi.x + roi.w).min(edges.w);
    let y1 = (roi.y + roi.h).min(edges.h);
    if roi.x >= edges.w || roi.y >= edges.h {
        return TextureFeatures {
            edge_density: 0.0,
            gradient_mean: 0.0,
            gradient_variance: 0.0,
        };
    }

    let mut edge_px = 0usize;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut n = 0usize;
    for y in roi.y..y1 {
        let mag_row = edges.grad.mag.row(y);
        for x in roi.x..x1 {
            if edges.is_edge(x, y) {
                edge_px += 1;
            }
            let m = mag_row[x] as f64;
            sum += m;
            sum_sq += m * m;
            n += 1;
        }
    }
    let n_f = n.max(1) as f64;
    let mean = sum / n_f;
    let variance = (sum_sq / n_f - mean * mean).max(0.0);

    TextureFeatures {
        edge_density: edge_px as f32 / n.max(1) as f32,
        gradient_mean: mean as f32,
        gradient_variance: variance as f32,
    }
}

fn color_features(frame: &ImageRgb8<'_>, roi: &Roi) -> ColorFeatures {
    let mut sum = [0.0f64; 3];
    let mut sum_sq = [0.0f64; 3];
    let mut sat_sum = 0.0f64;
    let mut val_sum = 0.0f64;
    let n = (roi.w * roi.h) as f64;

    for y in roi.y..roi.y + roi.h {
        let row = frame.row_rgb(y);
        for x in roi.x..roi.x + roi.w {
            let r = row[x * 3] as f64;
            let g = row[x * 3 + 1] as f64;
            let b = row[x * 3 + 2] as f64;
            sum[0] += r;
            sum[1] += g;
            sum[2] += b;
            sum_sq[0] += r * r;
            sum_sq[1] += g * g;
            sum_sq[2] += b * b;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            val_sum += max;
            if max > 0.0 {
                sat_sum += 255.0 * (max - min) / max;
            }
        }
    }

    let mut mean = [0.0f32; 3];
    let mut std = [0.0f32; 3];
    for c in 0..3 {
        let m = sum[c] / n;
        mean[c] = m as f32;
        std[c] = ((sum_sq[c] / n - m * m).max(0.0)).sqrt() as f32;
    }

    ColorFeatures {
        mean,
        std,
        saturation_mean: (sat_sum / n) as f32,
        brightness_mean: (val_sum / n) as f32,
    }
}

fn structural_features(edges: &EdgeMap, roi: &Roi) -> StructuralFeatures {
    let x1 = (roi.x + roi.w).min(edges.w).saturating_sub(1);
    let y1 = (roi.y + roi.h).min(edges.h).saturating_sub(1);
    let x0 = roi.x.min(x1);
    let y0 = roi.y.min(y1);

    // Perimeter coverage: an outline pixel counts when an edge pixel lies
    // within one pixel of it, tolerating the 1px halo NMS leaves around steps.
    let mut perimeter = 0usize;
    let mut covered = 0usize;
    let mut contrast_sum = 0.0f32;
    let mut probe = |x: usize, y: usize, edges: &EdgeMap| {
        perimeter += 1;
        contrast_sum += edges.grad.mag.get(x, y).min(1.0);
        let y_lo = y.saturating_sub(1);
        let y_hi = (y + 1).min(edges.h - 1);
        let x_lo = x.saturating_sub(1);
        let x_hi = (x + 1).min(edges.w - 1);
        'scan: for ny in y_lo..=y_hi {
            for nx in x_lo..=x_hi {
                if edges.is_edge(nx, ny) {
                    covered += 1;
                    break 'scan;
                }
            }
        }
    };
    for x in x0..=x1 {
        probe(x, y0, edges);
        if y1 > y0 {
            probe(x, y1, edges);
        }
    }
    for y in (y0 + 1)..y1 {
        probe(x0, y, edges);
        if x1 > x0 {
            probe(x1, y, edges);
        }
    }

    // Horizontal mirror similarity of the gradient field.
    let mut diff_sum = 0.0f32;
    let mut diff_n = 0usize;
    let half = roi.w / 2;
    for y in y0..=y1 {
        let row = edges.grad.mag.row(y);
        for k in 0..half {
            let left = roi.x + k;
            let right = roi.x + roi.w - 1 - k;
            if right < edges.w && left < edges.w {
                diff_sum += (row[left].min(1.0) - row[right].min(1.0)).abs();
                diff_n += 1;
            }
        }
    }
    let symmetry = if diff_n > 0 {
        (1.0 - diff_sum / diff_n as f32).clamp(0.0, 1.0)
    } else {
        0.0
    };

    StructuralFeatures {
        rectangularity: covered as f32 / perimeter.max(1) as f32,
        border_contrast: contrast_sum / perimeter.max(1) as f32,
        symmetry,
    }
}
