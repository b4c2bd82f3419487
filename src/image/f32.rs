//! Owned single-channel f32 plane in row-major layout.
//!
//! The pipeline's numeric workhorse: luma pyramid levels and gradient buffers
//! are all `ImageF32`. Always tightly packed (`stride == w`).

use crate::image::traits::{ImageView, ImageViewMut};

#[derive(Clone, Debug)]
pub struct ImageF32 {
    pub w: usize,
    pub h: usize,
    /// f32 elements between consecutive rows (equals `w`).
    pub stride: usize,
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Zero-initialized plane of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![0.0; w * h],
        }
    }

    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_map_onto_pixel_coordinates() {
        let mut img = ImageF32::new(4, 3);
        img.set(2, 1, 0.5);
        img.row_mut(2)[3] = 0.25;

        assert_eq!(img.row(1)[2], 0.5);
        assert_eq!(img.get(3, 2), 0.25);
        assert_eq!(img.row(0), &[0.0; 4]);
        assert_eq!(img.width(), 4);
        assert_eq!(img.height(), 3);
        assert_eq!(img.stride(), 4);
    }
}
