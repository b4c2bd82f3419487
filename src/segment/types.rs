use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in full-resolution pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BBox {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn area(&self) -> u32 {
        self.w * self.h
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }

    /// Intersection-over-union with another box, in [0, 1].
    pub fn overlap_ratio(&self, other: &BBox) -> f32 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.w).min(other.x + other.w);
        let bottom = (self.y + self.h).min(other.y + other.h);
        if left >= right || top >= bottom {
            return 0.0;
        }
        let intersection = ((right - left) as f32) * ((bottom - top) as f32);
        let union = self.area() as f32 + other.area() as f32 - intersection;
        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Euclidean distance between box centers.
    pub fn center_distance(&self, other: &BBox) -> f32 {
        let (cx1, cy1) = self.center();
        let (cx2, cy2) = other.center();
        ((cx1 - cx2).powi(2) + (cy1 - cy2).powi(2)).sqrt()
    }
}

/// A candidate rectangular area hypothesized to contain one UI element.
///
/// Coordinates are always expressed in the full-resolution frame so candidates
/// from different pyramid levels stay comparable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub bbox: BBox,
    /// Pyramid level the candidate was segmented on.
    pub level: usize,
    /// Full-resolution bounding-box area in pixels.
    pub area: u32,
}

impl Region {
    pub fn new(bbox: BBox, level: usize) -> Self {
        let area = bbox.area();
        Self { bbox, level, area }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_ratio_of_identical_boxes_is_one() {
        let b = BBox::new(10, 10, 50, 20);
        assert!((b.overlap_ratio(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overlap_ratio_of_disjoint_boxes_is_zero() {
        let a = BBox::new(0, 0, 10, 10);
        let b = BBox::new(100, 100, 10, 10);
        assert_eq!(a.overlap_ratio(&b), 0.0);
    }

    #[test]
    fn half_shifted_boxes_overlap_a_third() {
        // Two 20x20 boxes shifted by half their width: IoU = 200/600.
        let a = BBox::new(0, 0, 20, 20);
        let b = BBox::new(10, 0, 20, 20);
        let iou = a.overlap_ratio(&b);
        assert!((iou - 1.0 / 3.0).abs() < 1e-6);
    }
}
