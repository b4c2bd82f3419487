mod common;

use common::synthetic_image::busy_frame;
use element_detector::image::ImageRgb8;
use element_detector::segment::BBox;
use element_detector::{ElementDetector, ElementType, RecognitionConfig};

fn frame_data() -> (usize, usize, Vec<u8>) {
    let (w, h) = (640usize, 400usize);
    (w, h, busy_frame(w, h))
}

/// Identity of a detection ignoring the index-based context links.
fn shape(d: &element_detector::Detection) -> (ElementType, BBox, u32) {
    (d.element_type, d.bbox, d.area)
}

#[test]
fn two_detectors_with_equal_config_agree() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);

    let a = ElementDetector::new(RecognitionConfig::default()).unwrap();
    let b = ElementDetector::new(RecognitionConfig::default()).unwrap();
    assert_eq!(
        a.detect_clickable_elements(&frame).unwrap(),
        b.detect_clickable_elements(&frame).unwrap()
    );
}

#[test]
fn parallel_and_sequential_runs_are_identical() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);

    let mut parallel = RecognitionConfig::default();
    parallel.performance.enable_caching = false;
    parallel.performance.parallel_enabled = true;
    parallel.performance.max_workers = 4;

    let mut sequential = parallel;
    sequential.performance.parallel_enabled = false;

    let a = ElementDetector::new(parallel).unwrap();
    let b = ElementDetector::new(sequential).unwrap();
    assert_eq!(
        a.detect_clickable_elements(&frame).unwrap(),
        b.detect_clickable_elements(&frame).unwrap()
    );
}

#[test]
fn caching_is_transparent() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);

    let mut uncached_cfg = RecognitionConfig::default();
    uncached_cfg.performance.enable_caching = false;

    let cached = ElementDetector::new(RecognitionConfig::default()).unwrap();
    let uncached = ElementDetector::new(uncached_cfg).unwrap();

    let cold = cached.detect_clickable_elements(&frame).unwrap();
    let warm = cached.detect_clickable_elements(&frame).unwrap();
    let reference = uncached.detect_clickable_elements(&frame).unwrap();
    assert_eq!(cold, warm);
    assert_eq!(cold, reference);
}

#[test]
fn raising_thresholds_only_removes_detections() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);

    let lenient = ElementDetector::new(RecognitionConfig::default()).unwrap();

    let mut strict_cfg = RecognitionConfig::default();
    strict_cfg.classification.button = 0.95;
    let strict = ElementDetector::new(strict_cfg).unwrap();

    let lenient_buttons = lenient
        .detect_single_type(&frame, ElementType::Button)
        .unwrap()
        .len();
    let strict_buttons = strict
        .detect_single_type(&frame, ElementType::Button)
        .unwrap()
        .len();
    assert!(strict_buttons <= lenient_buttons);
}

#[test]
fn single_type_run_matches_filtered_full_run() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);
    let detector = ElementDetector::new(RecognitionConfig::default()).unwrap();

    let full: Vec<_> = detector
        .detect_clickable_elements(&frame)
        .unwrap()
        .iter()
        .filter(|d| d.element_type == ElementType::Button)
        .map(shape)
        .collect();
    // Suppression only ever compares same-type pairs, so restricting the
    // evaluated rules cannot change which buttons survive.
    let single: Vec<_> = detector
        .detect_single_type(&frame, ElementType::Button)
        .unwrap()
        .iter()
        .map(shape)
        .collect();
    assert_eq!(full, single);
}

#[test]
fn grouped_run_covers_exactly_the_requested_types() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);
    let detector = ElementDetector::new(RecognitionConfig::default()).unwrap();

    let types = [ElementType::Button, ElementType::Icon];
    let grouped = detector.detect_multiple_types(&frame, &types).unwrap();
    assert_eq!(grouped.len(), types.len());
    for (&ty, detections) in &grouped {
        assert!(types.contains(&ty));
        for d in detections {
            assert_eq!(d.element_type, ty);
        }
    }
}

#[test]
fn grouped_run_matches_single_type_run() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);
    let detector = ElementDetector::new(RecognitionConfig::default()).unwrap();

    let single: Vec<_> = detector
        .detect_single_type(&frame, ElementType::Button)
        .unwrap()
        .iter()
        .map(shape)
        .collect();
    let grouped = detector
        .detect_multiple_types(&frame, &[ElementType::Button])
        .unwrap();
    let from_group: Vec<_> = grouped[&ElementType::Button].iter().map(shape).collect();
    assert_eq!(single, from_group);
}

#[test]
fn detections_are_reported_in_canonical_order() {
    let (w, h, data) = frame_data();
    let frame = ImageRgb8::from_raw(w, h, &data);
    let detector = ElementDetector::new(RecognitionConfig::default()).unwrap();

    let detections = detector.detect_clickable_elements(&frame).unwrap();
    let keys: Vec<_> = detections
        .iter()
        .map(|d| (d.level, d.bbox.x, d.bbox.y))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}
