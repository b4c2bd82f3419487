//! Candidate region segmentation from per-level edge maps.
//!
//! Pipeline per pyramid level: Canny-style edge detection with the configured
//! low/high thresholds, a 3×3 morphological closing to bridge broken contours,
//! then 8-connected component labeling of the closed mask. Component bounding
//! boxes are rescaled into the full-resolution frame and filtered by area, so
//! every level yields comparable candidates.
//!
//! An empty result is a valid outcome for blank or uniform input.

mod types;

pub use types::{BBox, Region};

use crate::edges::{detect_edges, EdgeMap};
use crate::pyramid::PyramidLevel;
use serde::{Deserialize, Serialize};

/// Options controlling edge extraction and region filtering.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationOptions {
    /// Minimum full-resolution bounding-box area, in pixels.
    pub min_region_area: u32,
    /// Maximum full-resolution bounding-box area, in pixels.
    pub max_region_area: u32,
    /// Hysteresis low threshold on the 0–255 gradient scale.
    pub edge_threshold_low: f32,
    /// Hysteresis high threshold on the 0–255 gradient scale.
    pub edge_threshold_high: f32,
}

impl Default for SegmentationOptions {
    fn default() -> Self {
        Self {
            min_region_area: 50,
            max_region_area: 100_000,
            edge_threshold_low: 50.0,
            edge_threshold_high: 150.0,
        }
    }
}

/// Segments one pyramid level into candidate regions.
pub struct RegionSegmenter {
    options: SegmentationOptions,
}

impl RegionSegmenter {
    pub fn new(options: SegmentationOptions) -> Self {
        Self { options }
    }

    /// Run edge detection for `level` with the configured thresholds.
    pub fn detect_edges(&self, level: &PyramidLevel) -> EdgeMap {
        detect_edges(
            &level.image,
            self.options.edge_threshold_low,
            self.options.edge_threshold_high,
        )
    }

    /// Detect candidate regions on `level`, returning boxes in full-resolution
    /// coordinates. Deterministic for identical pixels and thresholds.
    pub fn segment(&self, level: &PyramidLevel) -> Vec<Region> {
        let edges = self.detect_edges(level);
        self.segment_with_edges(level, &edges)
    }

    /// Same as [`segment`](Self::segment) with a precomputed edge map, so the
    /// full-resolution map can be reused by feature extraction.
    pub fn segment_with_edges(&self, level: &PyramidLevel, edges: &EdgeMap) -> Vec<Region> {
        let closed = close_mask(edges);
        let boxes = connected_component_boxes(&closed, edges.w, edges.h);

        let inv_scale = 1.0 / level.scale;
        let mut regions = Vec::with_capacity(boxes.len());
        for (x0, y0, x1, y1) in boxes {
            // Rescale level-local coordinates into the original frame.
            let fx = (x0 as f32 * inv_scale).round() as u32;
            let fy = (y0 as f32 * inv_scale).round() as u32;
            let fw = (((x1 - x0 + 1) as f32) * inv_scale).round().max(1.0) as u32;
            let fh = (((y1 - y0 + 1) as f32) * inv_scale).round().max(1.0) as u32;
            let bbox = BBox::new(fx, fy, fw, fh);
            let area = bbox.area();
            if area < self.options.min_region_area || area > self.options.max_region_area {
                continue;
            }
            regions.push(Region::new(bbox, level.index));
        }

        log::debug!(
            "segment: level {} produced {} regions ({} edge px)",
            level.index,
            regions.len(),
            edges.edge_count()
        );
        regions
    }
}

/// 3×3 morphological closing (dilate then erode) on the edge mask.
fn close_mask(edges: &EdgeMap) -> Vec<u8> {
    let w = edges.w;
    let h = edges.h;
    let mut dilated = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            if edges.mask[y * w + x] == 0 {
                continue;
            }
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(h.saturating_sub(1));
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w.saturating_sub(1));
            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    dilated[ny * w + nx] = 1;
                }
            }
        }
    }
    let mut closed = vec![0u8; w * h];
    for y in 0..h {
        for x in 0..w {
            if dilated[y * w + x] == 0 {
                continue;
            }
            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(h.saturating_sub(1));
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w.saturating_sub(1));
            let mut all = true;
            'probe: for ny in y0..=y1 {
                for nx in x0..=x1 {
                    if dilated[ny * w + nx] == 0 {
                        all = false;
                        break 'probe;
                    }
                }
            }
            if all {
                closed[y * w + x] = 1;
            }
        }
    }
    closed
}

/// 8-connected component bounding boxes of a binary mask, in scan order.
fn connected_component_boxes(mask: &[u8], w: usize, h: usize) -> Vec<(usize, usize, usize, usize)> {
    let mut visited = vec![0u8; w * h];
    let mut stack: Vec<usize> = Vec::with_capacity(64);
    let mut boxes = Vec::new();

    for start in 0..w * h {
        if mask[start] == 0 || visited[start] != 0 {
            continue;
        }
        let mut min_x = usize::MAX;
        let mut min_y = usize::MAX;
        let mut max_x = 0usize;
        let mut max_y = 0usize;
        visited[start] = 1;
        stack.push(start);
        while let Some(idx) = stack.pop() {
            let x = idx % w;
            let y = idx / w;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= w as i32 || ny >= h as i32 {
                        continue;
                    }
                    let nidx = ny as usize * w + nx as usize;
                    if mask[nidx] != 0 && visited[nidx] == 0 {
                        visited[nidx] = 1;
                        stack.push(nidx);
                    }
                }
            }
        }
        boxes.push((min_x, min_y, max_x, max_y));
    }
    boxes
}
