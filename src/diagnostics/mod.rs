//! Serializable reports describing one analysis run.
//!
//! These are plain data carriers meant for JSON export; all derive
//! `Serialize` with camelCase keys so they can be dumped next to detection
//! results and inspected offline.

use serde::Serialize;

/// Shape of one pyramid level as actually built.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PyramidLevelReport {
    pub index: usize,
    pub width: usize,
    pub height: usize,
    /// Cumulative scale relative to the input frame.
    pub scale: f32,
    /// Edge pixels surviving hysteresis on this level.
    pub edge_count: usize,
    /// Candidate regions this level contributed after area filtering.
    pub region_count: usize,
}

/// Wall-clock cost of each pipeline stage, in milliseconds.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTimings {
    pub pyramid_ms: f64,
    pub segmentation_ms: f64,
    pub analysis_ms: f64,
    pub spatial_ms: f64,
    pub total_ms: f64,
}

/// Per-type label counts before spatial suppression.
#[derive(Clone, Copy, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCounts {
    pub button: usize,
    pub icon: usize,
    pub text: usize,
    pub link: usize,
    pub input: usize,
}

/// Full intermediate-state report for one frame.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDiagnostics {
    pub width: usize,
    pub height: usize,
    pub pyramid: Vec<PyramidLevelReport>,
    /// Total candidate regions across all levels.
    pub region_count: usize,
    /// Regions for which feature extraction succeeded.
    pub feature_count: usize,
    pub label_counts: LabelCounts,
    /// Detections surviving spatial resolution.
    pub detection_count: usize,
    pub timings: StageTimings,
}

/// Aggregate counters across the recognizer's lifetime (or since the last
/// reset). Latency average is over a bounded sliding window of recent runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    /// Analysis calls answered, cached or not.
    pub total_runs: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub average_latency_ms: f64,
    pub last_latency_ms: f64,
}
