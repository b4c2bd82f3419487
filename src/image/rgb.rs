//! Borrowed interleaved RGB view over caller-owned pixel memory.
//!
//! The recognizer never mutates the input frame; it only reads pixels through
//! this view, row by row. `stride` counts pixels (not bytes), so a tightly
//! packed buffer has `stride == w`.

/// Borrowed 8-bit RGB image, interleaved `[r, g, b]` triples in row-major order.
#[derive(Clone, Debug)]
pub struct ImageRgb8<'a> {
    pub w: usize,
    pub h: usize,
    /// Pixels between consecutive rows (equals `w` when tightly packed).
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> ImageRgb8<'a> {
    /// Wrap a tightly packed RGB buffer of `w * h * 3` bytes.
    pub fn from_raw(w: usize, h: usize, data: &'a [u8]) -> Self {
        debug_assert!(data.len() >= w * h * 3, "RGB buffer too small");
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    /// One image row as interleaved RGB bytes.
    #[inline]
    pub fn row_rgb(&self, y: usize) -> &[u8] {
        let start = y * self.stride * 3;
        &self.data[start..start + self.w * 3]
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}
