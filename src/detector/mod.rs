//! The unified recognition pipeline.
//!
//! [`ElementDetector`] wires every stage together: pyramid construction,
//! per-level segmentation, parallel feature extraction and classification,
//! and spatial resolution, with an optional whole-frame result cache in
//! front. One instance is built per configuration and is safe to share
//! across threads; all interior state (caches, counters) sits behind locks.

mod options;

pub use options::{PerformanceOptions, RecognitionConfig};

use crate::cache::{frame_fingerprint, CacheStats, RecognitionCache};
use crate::classify::{ElementClassifier, ElementType};
use crate::diagnostics::{
    ImageDiagnostics, LabelCounts, PerformanceStats, PyramidLevelReport, StageTimings,
};
use crate::error::DetectError;
use crate::features::FeatureExtractor;
use crate::image::ImageRgb8;
use crate::pyramid::Pyramid;
use crate::scheduler::ParallelScheduler;
use crate::segment::RegionSegmenter;
use crate::spatial::{Candidate, Detection, SpatialAnalyzer};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

/// Sliding window length for the average latency estimate.
const LATENCY_WINDOW: usize = 32;

#[derive(Default)]
struct PerfWindow {
    total_runs: u64,
    cache_hits: u64,
    cache_misses: u64,
    latencies: VecDeque<f64>,
    last_latency_ms: f64,
}

struct PipelineRun {
    detections: Vec<Detection>,
    pyramid: Vec<PyramidLevelReport>,
    region_count: usize,
    feature_count: usize,
    label_counts: LabelCounts,
    timings: StageTimings,
}

/// Locates interactive elements in raw RGB frames.
pub struct ElementDetector {
    config: RecognitionConfig,
    segmenter: RegionSegmenter,
    extractor: FeatureExtractor,
    classifier: ElementClassifier,
    analyzer: SpatialAnalyzer,
    scheduler: ParallelScheduler,
    cache: Option<RecognitionCache>,
    perf: Mutex<PerfWindow>,
}

impl ElementDetector {
    /// Validate `config` and assemble the pipeline. The thread pool (when
    /// parallelism is enabled) is owned by the returned instance.
    pub fn new(config: RecognitionConfig) -> Result<Self, DetectError> {
        config.validate()?;
        let caching = config.performance.enable_caching && config.performance.max_cache_size > 0;
        Ok(Self {
            segmenter: RegionSegmenter::new(config.segmentation),
            extractor: FeatureExtractor::new(caching, config.performance.max_cache_size),
            classifier: ElementClassifier::new(config.classification),
            analyzer: SpatialAnalyzer::new(config.spatial),
            scheduler: ParallelScheduler::new(
                config.performance.parallel_enabled,
                config.performance.max_workers,
            )?,
            cache: caching.then(|| RecognitionCache::new(config.performance.max_cache_size)),
            perf: Mutex::new(PerfWindow::default()),
            config,
        })
    }

    pub fn with_defaults() -> Result<Self, DetectError> {
        Self::new(RecognitionConfig::default())
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Detect every supported element type in `frame`.
    pub fn detect_clickable_elements(
        &self,
        frame: &ImageRgb8<'_>,
    ) -> Result<Vec<Detection>, DetectError> {
        self.detect_types(frame, &ElementType::ALL)
    }

    /// Detect one element type only; the other scoring rules never run.
    pub fn detect_single_type(
        &self,
        frame: &ImageRgb8<'_>,
        ty: ElementType,
    ) -> Result<Vec<Detection>, DetectError> {
        self.detect_types(frame, &[ty])
    }

    /// Detect a restricted set of element types, grouped per type.
    ///
    /// Every requested type appears as a key, possibly with an empty list.
    /// Context indices inside each detection refer to the combined
    /// resolution order, not positions within its group.
    pub fn detect_multiple_types(
        &self,
        frame: &ImageRgb8<'_>,
        types: &[ElementType],
    ) -> Result<BTreeMap<ElementType, Vec<Detection>>, DetectError> {
        let flat = self.detect_types(frame, types)?;
        let mut grouped: BTreeMap<ElementType, Vec<Detection>> =
            types.iter().map(|&ty| (ty, Vec::new())).collect();
        for detection in flat {
            if let Some(bucket) = grouped.get_mut(&detection.element_type) {
                bucket.push(detection);
            }
        }
        Ok(grouped)
    }

    /// Shared detection path: cache front, pipeline on miss, flat output.
    ///
    /// Restricting `types` equals the full run filtered down to them
    /// (spatial suppression only ever compares same-type pairs, so dropping
    /// other types cannot change the survivors).
    fn detect_types(
        &self,
        frame: &ImageRgb8<'_>,
        types: &[ElementType],
    ) -> Result<Vec<Detection>, DetectError> {
        let started = Instant::now();
        if frame.is_empty() || types.is_empty() {
            self.record_run(started);
            return Ok(Vec::new());
        }

        let fingerprint = self
            .cache
            .as_ref()
            .map(|_| frame_fingerprint(frame, &config_salt(&self.config, types)));
        if let (Some(cache), Some(fp)) = (&self.cache, &fingerprint) {
            if let Some(hit) = cache.get(fp) {
                self.perf.lock().cache_hits += 1;
                self.record_run(started);
                log::debug!("detect: frame cache hit, {} detections", hit.len());
                return Ok(hit);
            }
            self.perf.lock().cache_misses += 1;
        }

        let run = self.run_pipeline(frame, types)?;
        if let (Some(cache), Some(fp)) = (&self.cache, fingerprint) {
            cache.insert(fp, run.detections.clone());
        }
        self.record_run(started);
        log::info!(
            "detect: {} regions -> {} detections in {:.1} ms",
            run.region_count,
            run.detections.len(),
            run.timings.total_ms
        );
        Ok(run.detections)
    }

    /// Run the full pipeline and report every intermediate stage. Bypasses
    /// the frame cache so the numbers always describe a real run.
    pub fn diagnose_image(&self, frame: &ImageRgb8<'_>) -> Result<ImageDiagnostics, DetectError> {
        if frame.is_empty() {
            return Ok(ImageDiagnostics {
                width: frame.w,
                height: frame.h,
                pyramid: Vec::new(),
                region_count: 0,
                feature_count: 0,
                label_counts: LabelCounts::default(),
                detection_count: 0,
                timings: StageTimings::default(),
            });
        }
        let run = self.run_pipeline(frame, &ElementType::ALL)?;
        Ok(ImageDiagnostics {
            width: frame.w,
            height: frame.h,
            pyramid: run.pyramid,
            region_count: run.region_count,
            feature_count: run.feature_count,
            label_counts: run.label_counts,
            detection_count: run.detections.len(),
            timings: run.timings,
        })
    }

    /// Drop both cache tiers. Detection results are unaffected.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        self.extractor.clear_cache();
    }

    /// Frame-cache counters, `None` when caching is disabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        let perf = self.perf.lock();
        let average = if perf.latencies.is_empty() {
            0.0
        } else {
            perf.latencies.iter().sum::<f64>() / perf.latencies.len() as f64
        };
        let lookups = perf.cache_hits + perf.cache_misses;
        PerformanceStats {
            total_runs: perf.total_runs,
            cache_hits: perf.cache_hits,
            cache_misses: perf.cache_misses,
            cache_hit_rate: if lookups == 0 {
                0.0
            } else {
                perf.cache_hits as f64 / lookups as f64
            },
            average_latency_ms: average,
            last_latency_ms: perf.last_latency_ms,
        }
    }

    pub fn reset_performance_stats(&self) {
        *self.perf.lock() = PerfWindow::default();
    }

    fn record_run(&self, started: Instant) {
        let latency = started.elapsed().as_secs_f64() * 1e3;
        let mut perf = self.perf.lock();
        perf.total_runs += 1;
        perf.last_latency_ms = latency;
        perf.latencies.push_back(latency);
        if perf.latencies.len() > LATENCY_WINDOW {
            perf.latencies.pop_front();
        }
    }

    fn run_pipeline(
        &self,
        frame: &ImageRgb8<'_>,
        types: &[ElementType],
    ) -> Result<PipelineRun, DetectError> {
        let total_start = Instant::now();

        let stage = Instant::now();
        let pyramid = Pyramid::build(frame, self.config.pyramid)?;
        let pyramid_ms = ms_since(stage);

        // Segment every level; keep the level-0 edge map so feature
        // extraction can reuse it instead of recomputing full-res edges.
        let stage = Instant::now();
        let mut regions = Vec::new();
        let mut reports = Vec::with_capacity(pyramid.len());
        let mut edges0 = None;
        for level in &pyramid.levels {
            let edges = self.segmenter.detect_edges(level);
            let level_regions = self.segmenter.segment_with_edges(level, &edges);
            reports.push(PyramidLevelReport {
                index: level.index,
                width: level.image.w,
                height: level.image.h,
                scale: level.scale,
                edge_count: edges.edge_count(),
                region_count: level_regions.len(),
            });
            regions.extend(level_regions);
            if level.index == 0 {
                edges0 = Some(edges);
            }
        }
        let edges0 = match edges0 {
            Some(edges) => edges,
            None => {
                return Err(DetectError::invalid(
                    "pyramid.levels",
                    "pyramid produced no levels",
                ))
            }
        };
        let gray = &pyramid.levels[0].image;
        let region_count = regions.len();
        let segmentation_ms = ms_since(stage);

        // Per-region analysis: feature extraction plus classification, in
        // parallel chunks with input order preserved. A failing region is
        // logged and skipped.
        let stage = Instant::now();
        let outcomes = self.scheduler.map_ordered(regions, |region| {
            match self.extractor.extract(frame, gray, &edges0, &region) {
                Ok(vector) => {
                    let labels = self.classifier.classify_types(types, &vector);
                    Some((region, vector, labels))
                }
                Err(err) => {
                    log::warn!("skipping region: {err}");
                    None
                }
            }
        });

        let mut feature_count = 0usize;
        let mut label_counts = LabelCounts::default();
        let mut candidates = Vec::new();
        for outcome in outcomes.into_iter().flatten() {
            let (region, vector, labels) = outcome;
            feature_count += 1;
            for label in labels {
                match label.element_type {
                    ElementType::Button => label_counts.button += 1,
                    ElementType::Icon => label_counts.icon += 1,
                    ElementType::Text => label_counts.text += 1,
                    ElementType::Link => label_counts.link += 1,
                    ElementType::Input => label_counts.input += 1,
                }
                candidates.push(Candidate {
                    region,
                    label,
                    features: Some(vector),
                });
            }
        }
        let analysis_ms = ms_since(stage);

        let stage = Instant::now();
        let detections = self.analyzer.resolve(candidates);
        let spatial_ms = ms_since(stage);

        Ok(PipelineRun {
            detections,
            pyramid: reports,
            region_count,
            feature_count,
            label_counts,
            timings: StageTimings {
                pyramid_ms,
                segmentation_ms,
                analysis_ms,
                spatial_ms,
                total_ms: ms_since(total_start),
            },
        })
    }
}

fn ms_since(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

/// Cache salt binding a result to its configuration and requested types.
fn config_salt(config: &RecognitionConfig, types: &[ElementType]) -> Vec<u8> {
    let mut salt = serde_json::to_vec(config).unwrap_or_default();
    for ty in types {
        salt.extend_from_slice(ty.as_str().as_bytes());
        salt.push(b';');
    }
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn salt_distinguishes_type_sets() {
        let cfg = RecognitionConfig::default();
        let all = config_salt(&cfg, &ElementType::ALL);
        let one = config_salt(&cfg, &[ElementType::Button]);
        assert_ne!(all, one);
    }

    #[test]
    fn salt_distinguishes_configs() {
        let a = RecognitionConfig::default();
        let b = RecognitionConfig::fast();
        assert_ne!(
            config_salt(&a, &ElementType::ALL),
            config_salt(&b, &ElementType::ALL)
        );
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut cfg = RecognitionConfig::default();
        cfg.pyramid.scale_factor = 0.0;
        assert!(matches!(
            ElementDetector::new(cfg),
            Err(DetectError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn empty_frame_yields_no_detections() {
        let detector = ElementDetector::with_defaults().unwrap();
        let frame = ImageRgb8::from_raw(0, 0, &[]);
        let out = detector.detect_clickable_elements(&frame).unwrap();
        assert!(out.is_empty());
        assert_eq!(detector.performance_stats().total_runs, 1);
    }
}
