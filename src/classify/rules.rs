//! Per-type scoring rules over the unified feature space.
//!
//! Each rule is a weighted sum of bracketed sub-scores; brackets give full
//! credit inside the typical range for the type and half credit in a fringe
//! band around it. Scores are clamped to [0, 1]. The brackets are fixed
//! engine constants; only the acceptance thresholds are configurable.

use crate::features::FeatureVector;

/// Full credit inside [lo, hi], half credit inside [fringe_lo, fringe_hi].
fn bracket(value: f32, lo: f32, hi: f32, fringe_lo: f32, fringe_hi: f32, weight: f32) -> f32 {
    if (lo..=hi).contains(&value) {
        weight
    } else if (fringe_lo..=fringe_hi).contains(&value) {
        weight * 0.5
    } else {
        0.0
    }
}

fn step(value: f32, full_at: f32, half_at: f32, weight: f32) -> f32 {
    if value > full_at {
        weight
    } else if value > half_at {
        weight * 0.5
    } else {
        0.0
    }
}

pub(super) fn button_score(v: &FeatureVector) -> f32 {
    let area = v.geometric.width * v.geometric.height;
    let mut score = 0.0;
    score += bracket(area, 200.0, 20_000.0, 100.0, 50_000.0, 0.3);
    score += bracket(v.geometric.aspect_ratio, 0.3, 6.0, 0.1, 10.0, 0.2);
    score += step(v.geometric.fill_ratio, 0.5, 0.3, 0.15);
    if is_button_color(v) {
        score += 0.25;
    }
    score += bracket(v.texture.edge_density, 0.1, 0.4, 0.05, 0.6, 0.1);
    score.min(1.0)
}

pub(super) fn icon_score(v: &FeatureVector) -> f32 {
    let area = v.geometric.width * v.geometric.height;
    let mut score = 0.0;
    score += bracket(v.geometric.aspect_ratio, 0.6, 2.0, 0.4, 3.0, 0.3);
    score += bracket(area, 64.0, 8_000.0, 32.0, 15_000.0, 0.25);
    score += step(v.structural.symmetry, 0.6, 0.4, 0.2);
    score += step(v.structural.border_contrast, 0.3, 0.15, 0.25);
    score.min(1.0)
}

pub(super) fn text_score(v: &FeatureVector) -> f32 {
    let area = v.geometric.width * v.geometric.height;
    let mut score = 0.0;
    // Text lines are wide and sparsely filled with high-variance strokes.
    score += step(v.geometric.aspect_ratio, 2.0, 1.5, 0.25);
    score += bracket(area, 100.0, 10_000.0, 50.0, 20_000.0, 0.2);
    score += step(v.texture.gradient_variance, 0.04, 0.015, 0.2);
    if v.geometric.fill_ratio < 0.35 {
        score += 0.25;
    } else if v.geometric.fill_ratio < 0.5 {
        score += 0.1;
    }
    score += bracket(v.texture.edge_density, 0.05, 0.3, 0.02, 0.4, 0.1);
    score.min(1.0)
}

pub(super) fn link_score(v: &FeatureVector) -> f32 {
    let area = v.geometric.width * v.geometric.height;
    let mut score = 0.0;
    score += step(v.geometric.aspect_ratio, 1.5, 1.0, 0.25);
    score += bracket(area, 50.0, 5_000.0, 30.0, 8_000.0, 0.2);
    if is_link_color(v) {
        score += 0.3;
    }
    score += bracket(v.texture.edge_density, 0.08, 0.25, 0.05, 0.35, 0.15);
    if v.geometric.fill_ratio < 0.5 {
        score += 0.1;
    }
    score.min(1.0)
}

pub(super) fn input_score(v: &FeatureVector) -> f32 {
    let area = v.geometric.width * v.geometric.height;
    let mut score = 0.0;
    score += bracket(v.geometric.aspect_ratio, 2.0, 8.0, 1.5, 12.0, 0.3);
    score += bracket(area, 500.0, 15_000.0, 200.0, 25_000.0, 0.25);
    score += step(v.structural.border_contrast, 0.4, 0.2, 0.2);
    score += step(v.geometric.fill_ratio, 0.7, 0.5, 0.15);
    if is_input_background(v) {
        score += 0.1;
    }
    score.min(1.0)
}

/// Saturated with moderate brightness, or a plain gray widget tone.
fn is_button_color(v: &FeatureVector) -> bool {
    let sat = v.color.saturation_mean;
    let val = v.color.brightness_mean;
    (sat > 30.0 && (50.0..=200.0).contains(&val)) || (sat <= 30.0 && (80.0..=180.0).contains(&val))
}

/// Blue-dominant and clearly saturated, the conventional hyperlink tint.
fn is_link_color(v: &FeatureVector) -> bool {
    let [r, g, b] = v.color.mean;
    b > r + 20.0 && b > g + 10.0 && v.color.saturation_mean > 50.0
}

/// Bright, washed-out interior typical of an empty input field.
fn is_input_background(v: &FeatureVector) -> bool {
    v.color.brightness_mean > 200.0 && v.color.saturation_mean < 30.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ColorFeatures, GeometricFeatures, StructuralFeatures, TextureFeatures};

    fn vector() -> FeatureVector {
        FeatureVector {
            geometric: GeometricFeatures {
                width: 100.0,
                height: 40.0,
                aspect_ratio: 2.5,
                fill_ratio: 0.9,
            },
            texture: TextureFeatures {
                edge_density: 0.2,
                gradient_mean: 0.2,
                gradient_variance: 0.05,
            },
            color: ColorFeatures {
                mean: [90.0, 90.0, 120.0],
                std: [10.0, 10.0, 10.0],
                saturation_mean: 60.0,
                brightness_mean: 120.0,
            },
            structural: StructuralFeatures {
                rectangularity: 0.9,
                border_contrast: 0.5,
                symmetry: 0.8,
            },
        }
    }

    #[test]
    fn solid_rectangle_scores_high_as_button() {
        let v = vector();
        assert!(button_score(&v) >= 0.8, "score={}", button_score(&v));
    }

    #[test]
    fn sparse_wide_region_scores_as_text() {
        let mut v = vector();
        v.geometric.fill_ratio = 0.2;
        v.geometric.aspect_ratio = 5.0;
        v.geometric.width = 200.0;
        v.geometric.height = 40.0;
        assert!(text_score(&v) >= 0.6, "score={}", text_score(&v));
    }

    #[test]
    fn blue_tint_is_required_for_full_link_score() {
        let mut blue = vector();
        blue.color.mean = [40.0, 60.0, 180.0];
        let gray = vector();
        assert!(link_score(&blue) > link_score(&gray));
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let v = vector();
        for score in [
            button_score(&v),
            icon_score(&v),
            text_score(&v),
            link_score(&v),
            input_score(&v),
        ] {
            assert!((0.0..=1.0).contains(&score));
        }
    }
}
