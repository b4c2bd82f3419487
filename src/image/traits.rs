//! Row-access contract shared by the pixel planes.
//!
//! Every plane in the pipeline is row-major with a stride counted in pixels,
//! so the stages only ever need per-row slices.

pub trait ImageView {
    type Pixel: Copy;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn stride(&self) -> usize;

    /// Pixels of row `y`, exactly `width` long.
    fn row(&self, y: usize) -> &[Self::Pixel];
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, y: usize) -> &mut [Self::Pixel];
}
