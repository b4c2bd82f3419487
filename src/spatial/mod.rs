//! Spatial conflict resolution and proximity context.
//!
//! Candidates from all pyramid levels land here as (region, label) pairs. The
//! analyzer suppresses duplicate same-type candidates by intersection-over-
//! union, then records proximity relations between the survivors. Candidates
//! are stably ordered by (level, x, y) before resolution so tie-breaks are
//! reproducible; the output keeps that order.
//!
//! The relation structure is index-based (positions into the returned list),
//! deliberately avoiding any pointer-linked graph.

use crate::classify::{ClassificationResult, ElementType};
use crate::features::FeatureVector;
use crate::segment::{BBox, Region};
use serde::{Deserialize, Serialize};

/// Options for overlap suppression and proximity linking.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialOptions {
    /// IoU at or above which two same-type candidates conflict.
    pub overlap_threshold: f32,
    /// Center distance (pixels) below which two detections are "nearby".
    pub semantic_distance_threshold: f32,
}

impl Default for SpatialOptions {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.3,
            semantic_distance_threshold: 50.0,
        }
    }
}

/// Proximity relations of one detection, as indices into the result list.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticContext {
    /// Detections within the semantic distance threshold, nearest first.
    pub nearby: Vec<usize>,
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub above: Vec<usize>,
    pub below: Vec<usize>,
}

impl SemanticContext {
    pub fn is_empty(&self) -> bool {
        self.nearby.is_empty()
    }
}

/// One recognized interactive region, the externally visible unit.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub bbox: BBox,
    pub confidence: f32,
    pub center: (f32, f32),
    pub area: u32,
    /// Pyramid level the underlying candidate came from.
    pub level: usize,
    /// Descriptor the label was scored from, retained for diagnostics
    /// consumers. Populated by the pipeline and carried through cache hits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
    pub semantic_context: SemanticContext,
}

/// A labeled region candidate awaiting spatial resolution.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub region: Region,
    pub label: ClassificationResult,
    pub features: Option<FeatureVector>,
}

/// Merges and suppresses overlapping candidates, then links neighbours.
pub struct SpatialAnalyzer {
    options: SpatialOptions,
}

impl SpatialAnalyzer {
    pub fn new(options: SpatialOptions) -> Self {
        Self { options }
    }

    /// Resolve overlap conflicts and attach semantic context.
    ///
    /// Postcondition: no two same-type detections in the output overlap at or
    /// above the configured threshold. Cross-type overlaps (an icon inside a
    /// button) are preserved.
    pub fn resolve(&self, mut candidates: Vec<Candidate>) -> Vec<Detection> {
        // Stable canonical order so every later tie-break is reproducible.
        candidates.sort_by(|a, b| {
            (a.region.level, a.region.bbox.x, a.region.bbox.y, a.label.element_type)
                .cmp(&(b.region.level, b.region.bbox.x, b.region.bbox.y, b.label.element_type))
        });

        let keep = self.suppress_overlaps(&candidates);
        let retained: Vec<&Candidate> = keep.iter().map(|&i| &candidates[i]).collect();

        let mut detections: Vec<Detection> = retained
            .iter()
            .map(|c| Detection {
                element_type: c.label.element_type,
                bbox: c.region.bbox,
                confidence: c.label.confidence,
                center: c.region.bbox.center(),
                area: c.region.bbox.area(),
                level: c.region.level,
                features: c.features,
                semantic_context: SemanticContext::default(),
            })
            .collect();

        self.link_neighbours(&mut detections);

        log::debug!(
            "spatial: {} candidates -> {} detections",
            candidates.len(),
            detections.len()
        );
        detections
    }

    /// Greedy non-maximum suppression over same-type pairs. Returns indices of
    /// surviving candidates in canonical order.
    fn suppress_overlaps(&self, candidates: &[Candidate]) -> Vec<usize> {
        // Visit candidates from strongest to weakest: higher confidence first,
        // then larger area, then finer pyramid level, then canonical position.
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| {
            let ca = &candidates[a];
            let cb = &candidates[b];
            cb.label
                .confidence
                .partial_cmp(&ca.label.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| cb.region.area.cmp(&ca.region.area))
                .then_with(|| ca.region.level.cmp(&cb.region.level))
                .then_with(|| a.cmp(&b))
        });

        let mut suppressed = vec![false; candidates.len()];
        for (rank, &i) in order.iter().enumerate() {
            if suppressed[i] {
                continue;
            }
            for &j in &order[rank + 1..] {
                if suppressed[j] {
                    continue;
                }
                if candidates[i].label.element_type != candidates[j].label.element_type {
                    continue;
                }
                let iou = candidates[i]
                    .region
                    .bbox
                    .overlap_ratio(&candidates[j].region.bbox);
                if iou >= self.options.overlap_threshold {
                    suppressed[j] = true;
                }
            }
        }

        (0..candidates.len()).filter(|&i| !suppressed[i]).collect()
    }

    /// Record bidirectional nearby/direction relations between retained
    /// detections whose centers are closer than the distance threshold.
    fn link_neighbours(&self, detections: &mut [Detection]) {
        let n = detections.len();
        let mut links: Vec<Vec<(usize, f32)>> = vec![Vec::new(); n];
        for i in 0..n {
            for j in i + 1..n {
                let dist = detections[i].bbox.center_distance(&detections[j].bbox);
                if dist < self.options.semantic_distance_threshold {
                    links[i].push((j, dist));
                    links[j].push((i, dist));
                }
            }
        }
        for (i, mut neighbours) in links.into_iter().enumerate() {
            neighbours.sort_by(|a, b| {
                a.1.partial_cmp(&b.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            let (cx, cy) = detections[i].center;
            for (j, _) in neighbours {
                let (nx, ny) = detections[j].center;
                let dx = nx - cx;
                let dy = ny - cy;
                detections[i].semantic_context.nearby.push(j);
                if dx.abs() > dy.abs() {
                    if dx > 0.0 {
                        detections[i].semantic_context.right.push(j);
                    } else {
                        detections[i].semantic_context.left.push(j);
                    }
                } else if dy > 0.0 {
                    detections[i].semantic_context.below.push(j);
                } else {
                    detections[i].semantic_context.above.push(j);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ClassificationResult;

    fn candidate(
        bbox: BBox,
        level: usize,
        ty: ElementType,
        confidence: f32,
    ) -> Candidate {
        Candidate {
            region: Region::new(bbox, level),
            label: ClassificationResult {
                element_type: ty,
                confidence,
            },
            features: None,
        }
    }

    #[test]
    fn same_type_overlap_keeps_higher_confidence() {
        let a = candidate(BBox::new(0, 0, 20, 20), 0, ElementType::Button, 0.9);
        let b = candidate(BBox::new(5, 0, 20, 20), 0, ElementType::Button, 0.6);
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let out = analyzer.resolve(vec![a, b]);
        assert_eq!(out.len(), 1);
        assert!((out[0].confidence - 0.9).abs() < 1e-6);
        assert_eq!(out[0].bbox.x, 0);
    }

    #[test]
    fn cross_type_overlap_is_preserved() {
        let a = candidate(BBox::new(0, 0, 40, 40), 0, ElementType::Button, 0.8);
        let b = candidate(BBox::new(5, 5, 30, 30), 0, ElementType::Icon, 0.7);
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let out = analyzer.resolve(vec![a, b]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn confidence_tie_prefers_larger_area() {
        let small = candidate(BBox::new(2, 2, 16, 16), 0, ElementType::Icon, 0.7);
        let large = candidate(BBox::new(0, 0, 20, 20), 0, ElementType::Icon, 0.7);
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let out = analyzer.resolve(vec![small, large]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area, 400);
    }

    #[test]
    fn area_tie_prefers_finer_level() {
        let coarse = candidate(BBox::new(0, 0, 20, 20), 2, ElementType::Icon, 0.7);
        let fine = candidate(BBox::new(1, 0, 20, 20), 0, ElementType::Icon, 0.7);
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let out = analyzer.resolve(vec![coarse, fine]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].level, 0);
    }

    #[test]
    fn output_satisfies_overlap_invariant() {
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let candidates = vec![
            candidate(BBox::new(0, 0, 30, 30), 0, ElementType::Button, 0.5),
            candidate(BBox::new(10, 0, 30, 30), 1, ElementType::Button, 0.6),
            candidate(BBox::new(20, 0, 30, 30), 0, ElementType::Button, 0.7),
            candidate(BBox::new(200, 200, 30, 30), 0, ElementType::Button, 0.4),
        ];
        let out = analyzer.resolve(candidates);
        for i in 0..out.len() {
            for j in i + 1..out.len() {
                if out[i].element_type == out[j].element_type {
                    assert!(out[i].bbox.overlap_ratio(&out[j].bbox) < 0.3);
                }
            }
        }
    }

    #[test]
    fn nearby_relations_are_bidirectional_and_directional() {
        let a = candidate(BBox::new(0, 0, 20, 20), 0, ElementType::Button, 0.8);
        let b = candidate(BBox::new(30, 0, 20, 20), 0, ElementType::Text, 0.6);
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let out = analyzer.resolve(vec![a, b]);
        assert_eq!(out.len(), 2);
        // Canonical order: button at x=0 first, text at x=30 second.
        assert_eq!(out[0].semantic_context.nearby, vec![1]);
        assert_eq!(out[1].semantic_context.nearby, vec![0]);
        assert_eq!(out[0].semantic_context.right, vec![1]);
        assert_eq!(out[1].semantic_context.left, vec![0]);
    }

    #[test]
    fn distant_detections_are_not_linked() {
        let a = candidate(BBox::new(0, 0, 20, 20), 0, ElementType::Button, 0.8);
        let b = candidate(BBox::new(500, 500, 20, 20), 0, ElementType::Text, 0.6);
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let out = analyzer.resolve(vec![a, b]);
        assert!(out[0].semantic_context.is_empty());
        assert!(out[1].semantic_context.is_empty());
    }

    #[test]
    fn resolution_is_deterministic_under_input_shuffling() {
        let mk = || {
            vec![
                candidate(BBox::new(0, 0, 30, 30), 0, ElementType::Button, 0.5),
                candidate(BBox::new(10, 0, 30, 30), 1, ElementType::Button, 0.6),
                candidate(BBox::new(100, 50, 40, 20), 0, ElementType::Text, 0.45),
            ]
        };
        let analyzer = SpatialAnalyzer::new(SpatialOptions::default());
        let a = analyzer.resolve(mk());
        let mut shuffled = mk();
        shuffled.reverse();
        let b = analyzer.resolve(shuffled);
        assert_eq!(a, b);
    }
}
