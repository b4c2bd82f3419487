//! Unified runtime configuration for the full pipeline.

use crate::classify::ClassificationOptions;
use crate::error::DetectError;
use crate::pyramid::PyramidOptions;
use crate::segment::SegmentationOptions;
use crate::spatial::SpatialOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Caching and parallelism knobs.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceOptions {
    /// Enables both the per-region and whole-frame caches.
    pub enable_caching: bool,
    /// Capacity of each cache tier, in entries.
    pub max_cache_size: usize,
    pub parallel_enabled: bool,
    pub max_workers: usize,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            enable_caching: true,
            max_cache_size: 100,
            parallel_enabled: true,
            max_workers: 4,
        }
    }
}

/// Complete configuration, one section per pipeline stage. Every section and
/// field has a default, so a partial JSON document is a valid config.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub pyramid: PyramidOptions,
    pub segmentation: SegmentationOptions,
    pub classification: ClassificationOptions,
    pub spatial: SpatialOptions,
    pub performance: PerformanceOptions,
}

impl RecognitionConfig {
    /// Fewer levels and a coarser floor; trades recall for speed.
    pub fn fast() -> Self {
        let mut cfg = Self::default();
        cfg.pyramid.levels = 2;
        cfg.pyramid.min_size = 64;
        cfg.segmentation.min_region_area = 100;
        cfg
    }

    /// Deeper pyramid and lower thresholds; trades speed for recall.
    pub fn accurate() -> Self {
        let mut cfg = Self::default();
        cfg.pyramid.levels = 5;
        cfg.pyramid.min_size = 16;
        cfg.segmentation.min_region_area = 30;
        cfg.classification.text = 0.25;
        cfg.classification.icon = 0.3;
        cfg
    }

    /// Parse a JSON config file. Missing fields fall back to defaults;
    /// the result is validated before being returned.
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| format!("failed to parse {}: {e}", path.display()))?;
        cfg.validate().map_err(|e| e.to_string())?;
        Ok(cfg)
    }

    /// Cross-field validation of every section.
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.pyramid.levels == 0 {
            return Err(DetectError::invalid("pyramid.levels", "must be at least 1"));
        }
        if !(self.pyramid.scale_factor > 0.0 && self.pyramid.scale_factor < 1.0) {
            return Err(DetectError::invalid(
                "pyramid.scale_factor",
                format!("must be in (0, 1), got {}", self.pyramid.scale_factor),
            ));
        }
        if self.pyramid.min_size == 0 {
            return Err(DetectError::invalid("pyramid.min_size", "must be at least 1"));
        }
        if self.segmentation.min_region_area > self.segmentation.max_region_area {
            return Err(DetectError::invalid(
                "segmentation.min_region_area",
                format!(
                    "must not exceed max_region_area ({} > {})",
                    self.segmentation.min_region_area, self.segmentation.max_region_area
                ),
            ));
        }
        if self.segmentation.edge_threshold_low <= 0.0
            || self.segmentation.edge_threshold_high <= self.segmentation.edge_threshold_low
        {
            return Err(DetectError::invalid(
                "segmentation.edge_threshold_high",
                "thresholds must satisfy 0 < low < high",
            ));
        }
        for (field, value) in [
            ("classification.button", self.classification.button),
            ("classification.icon", self.classification.icon),
            ("classification.text", self.classification.text),
            ("classification.link", self.classification.link),
            ("classification.input", self.classification.input),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DetectError::invalid(field, format!("must be in [0, 1], got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.spatial.overlap_threshold) {
            return Err(DetectError::invalid(
                "spatial.overlap_threshold",
                format!("must be in [0, 1], got {}", self.spatial.overlap_threshold),
            ));
        }
        if self.spatial.semantic_distance_threshold <= 0.0 {
            return Err(DetectError::invalid(
                "spatial.semantic_distance_threshold",
                "must be positive",
            ));
        }
        if self.performance.max_workers == 0 {
            return Err(DetectError::invalid(
                "performance.max_workers",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(RecognitionConfig::default().validate().is_ok());
        assert!(RecognitionConfig::fast().validate().is_ok());
        assert!(RecognitionConfig::accurate().validate().is_ok());
    }

    #[test]
    fn bad_scale_factor_is_rejected() {
        let mut cfg = RecognitionConfig::default();
        cfg.pyramid.scale_factor = 1.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_edge_thresholds_are_rejected() {
        let mut cfg = RecognitionConfig::default();
        cfg.segmentation.edge_threshold_low = 200.0;
        cfg.segmentation.edge_threshold_high = 100.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_gets_defaults() {
        let cfg: RecognitionConfig =
            serde_json::from_str(r#"{"pyramid": {"levels": 2}}"#).unwrap();
        assert_eq!(cfg.pyramid.levels, 2);
        assert!((cfg.pyramid.scale_factor - 0.5).abs() < 1e-6);
        assert!(cfg.performance.enable_caching);
        assert_eq!(cfg.performance.max_workers, 4);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let mut cfg = RecognitionConfig::default();
        cfg.classification.link = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("classification.link"));
    }
}
