use serde::{Deserialize, Serialize};

/// Options controlling pyramid construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PyramidOptions {
    /// Number of pyramid levels (>= 1). Construction may stop earlier when a
    /// level would fall below `min_size`.
    pub levels: usize,
    /// Per-level scale factor, strictly inside (0, 1).
    pub scale_factor: f32,
    /// Minimum width/height of a generated level, in pixels.
    pub min_size: usize,
}

impl Default for PyramidOptions {
    fn default() -> Self {
        Self {
            levels: 4,
            scale_factor: 0.5,
            min_size: 32,
        }
    }
}
