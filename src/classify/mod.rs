//! Rule-based element classification.
//!
//! A closed set of per-type scoring strategies maps a [`FeatureVector`] to
//! confidences in [0, 1]. A region is labeled with every type whose confidence
//! reaches that type's configured threshold; disambiguating between multiple
//! surviving labels is deliberately left to spatial resolution and callers.

mod rules;

use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};

/// The element types the engine recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Button,
    Icon,
    Text,
    Link,
    Input,
}

impl ElementType {
    pub const ALL: [ElementType; 5] = [
        ElementType::Button,
        ElementType::Icon,
        ElementType::Text,
        ElementType::Link,
        ElementType::Input,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Button => "button",
            ElementType::Icon => "icon",
            ElementType::Text => "text",
            ElementType::Link => "link",
            ElementType::Input => "input",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type acceptance thresholds.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationOptions {
    pub button: f32,
    pub icon: f32,
    pub text: f32,
    pub link: f32,
    pub input: f32,
}

impl Default for ClassificationOptions {
    fn default() -> Self {
        Self {
            button: 0.4,
            icon: 0.35,
            text: 0.3,
            link: 0.35,
            input: 0.4,
        }
    }
}

impl ClassificationOptions {
    pub fn threshold(&self, ty: ElementType) -> f32 {
        match ty {
            ElementType::Button => self.button,
            ElementType::Icon => self.icon,
            ElementType::Text => self.text,
            ElementType::Link => self.link,
            ElementType::Input => self.input,
        }
    }

    pub fn set_threshold(&mut self, ty: ElementType, threshold: f32) {
        match ty {
            ElementType::Button => self.button = threshold,
            ElementType::Icon => self.icon = threshold,
            ElementType::Text => self.text = threshold,
            ElementType::Link => self.link = threshold,
            ElementType::Input => self.input = threshold,
        }
    }
}

/// One accepted label for a region.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub element_type: ElementType,
    pub confidence: f32,
}

/// Scores feature vectors against the per-type rule table.
pub struct ElementClassifier {
    options: ClassificationOptions,
}

impl ElementClassifier {
    pub fn new(options: ClassificationOptions) -> Self {
        Self { options }
    }

    /// Raw confidence of one rule, ignoring thresholds. Pure.
    pub fn score(&self, ty: ElementType, vector: &FeatureVector) -> f32 {
        match ty {
            ElementType::Button => rules::button_score(vector),
            ElementType::Icon => rules::icon_score(vector),
            ElementType::Text => rules::text_score(vector),
            ElementType::Link => rules::link_score(vector),
            ElementType::Input => rules::input_score(vector),
        }
    }

    /// All labels whose confidence reaches the configured threshold.
    pub fn classify(&self, vector: &FeatureVector) -> Vec<ClassificationResult> {
        self.classify_types(&ElementType::ALL, vector)
    }

    /// Restricted classification: only the requested rules are evaluated.
    pub fn classify_types(
        &self,
        types: &[ElementType],
        vector: &FeatureVector,
    ) -> Vec<ClassificationResult> {
        let mut results = Vec::new();
        for &ty in types {
            let confidence = self.score(ty, vector);
            if confidence >= self.options.threshold(ty) {
                results.push(ClassificationResult {
                    element_type: ty,
                    confidence,
                });
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ColorFeatures, GeometricFeatures, StructuralFeatures, TextureFeatures};

    fn button_vector() -> FeatureVector {
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
    fn solid_rectangle_is_labeled_button() {
        let classifier = ElementClassifier::new(ClassificationOptions::default());
        let labels = classifier.classify(&button_vector());
        assert!(labels
            .iter()
            .any(|l| l.element_type == ElementType::Button && l.confidence >= 0.4));
    }

    #[test]
    fn restricted_classification_matches_filtered_full_run() {
        let classifier = ElementClassifier::new(ClassificationOptions::default());
        let v = button_vector();
        let full: Vec<_> = classifier
            .classify(&v)
            .into_iter()
            .filter(|l| l.element_type == ElementType::Button)
            .collect();
        let single = classifier.classify_types(&[ElementType::Button], &v);
        assert_eq!(full, single);
    }

    #[test]
    fn raising_a_threshold_never_adds_labels() {
        let v = button_vector();
        let lenient = ElementClassifier::new(ClassificationOptions::default());
        let mut strict_opts = ClassificationOptions::default();
        strict_opts.set_threshold(ElementType::Button, 0.99);
        let strict = ElementClassifier::new(strict_opts);

        let n_lenient = lenient
            .classify(&v)
            .iter()
            .filter(|l| l.element_type == ElementType::Button)
            .count();
        let n_strict = strict
            .classify(&v)
            .iter()
            .filter(|l| l.element_type == ElementType::Button)
            .count();
        assert!(n_strict <= n_lenient);
    }

    #[test]
    fn multiple_labels_are_possible() {
        // An ambiguous shape may legitimately satisfy several rules at once.
        let classifier = ElementClassifier::new(ClassificationOptions::default());
        let labels = classifier.classify(&button_vector());
        assert!(!labels.is_empty());
        for label in &labels {
            assert!((0.0..=1.0).contains(&label.confidence));
        }
    }
}
