//! Multi-scale recognition of interactive UI regions in raw screen images.
//!
//! The pipeline runs in fixed stages: an [`pyramid::Pyramid`] of luma planes,
//! per-level edge-based segmentation into candidate [`segment::Region`]s,
//! feature extraction and rule-based classification per candidate, and a
//! spatial pass that suppresses duplicate same-type candidates and links
//! nearby detections. [`ElementDetector`] owns the whole pipeline plus the
//! optional caches and thread pool; it is the main entry point.
//!
//! ```no_run
//! use element_detector::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (w, h) = (800usize, 600usize);
//! let pixels = vec![255u8; w * h * 3];
//! let frame = ImageRgb8::from_raw(w, h, &pixels);
//!
//! let detector = ElementDetector::new(RecognitionConfig::default())?;
//! let detections = detector.detect_clickable_elements(&frame)?;
//! for d in &detections {
//!     println!("{} at ({}, {}) conf={:.2}", d.element_type, d.bbox.x, d.bbox.y, d.confidence);
//! }
//! # Ok(())
//! # }
//! ```

// Public modules (stable-ish surface)
pub mod classify;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod spatial;

// Pipeline stages; public for tools and tests, considered unstable internals.
pub mod cache;
pub mod edges;
pub mod features;
pub mod pyramid;
pub mod scheduler;
pub mod segment;

// --- High-level re-exports -------------------------------------------------

pub use crate::classify::ElementType;
pub use crate::detector::{ElementDetector, RecognitionConfig};
pub use crate::diagnostics::{ImageDiagnostics, PerformanceStats};
pub use crate::error::DetectError;
pub use crate::segment::BBox;
pub use crate::spatial::Detection;

/// Small prelude for quick experiments.
pub mod prelude {
    pub use crate::image::{ImageRgb8, RgbFrame};
    pub use crate::{BBox, Detection, DetectError, ElementDetector, ElementType, RecognitionConfig};
}
