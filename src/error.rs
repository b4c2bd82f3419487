//! Error taxonomy for the recognition engine.
//!
//! Configuration problems abort a call before any pixel work starts; per-region
//! anomalies are logged and skipped so one bad candidate cannot fail the whole
//! frame. Zero detections is a normal outcome, not an error.

/// Errors surfaced by the detection pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectError {
    /// Malformed configuration: out-of-range thresholds or non-positive
    /// pyramid parameters. Surfaced synchronously at call time.
    InvalidParameter { field: &'static str, message: String },
    /// Feature extraction failed for a single region. Callers inside the
    /// pipeline drop the region and continue; this variant only escapes when
    /// `FeatureExtractor::extract` is invoked directly.
    FeatureExtraction { bbox: (u32, u32, u32, u32), message: String },
}

impl std::fmt::Display for DetectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectError::InvalidParameter { field, message } => {
                write!(f, "invalid parameter `{field}`: {message}")
            }
            DetectError::FeatureExtraction { bbox, message } => {
                write!(
                    f,
                    "feature extraction failed for region ({}, {}, {}, {}): {message}",
                    bbox.0, bbox.1, bbox.2, bbox.3
                )
            }
        }
    }
}

impl std::error::Error for DetectError {}

impl DetectError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DetectError::InvalidParameter {
            field,
            message: message.into(),
        }
    }
}
