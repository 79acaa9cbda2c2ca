//! Two-stage screening classifier: gate on "is this an X-ray", then score
//! pneumonia likelihood.

use std::fmt;

use ::image::DynamicImage;

use crate::error::{Error, Result};
use crate::image::{self, ImageTensor};
use crate::model::{InferenceModel, ModelKind, ModelStore, OnnxModel};

/// Configuration for the screening pipeline.
///
/// The defaults reproduce the decision boundaries the models were calibrated
/// against; changing them changes the label mapping only, never the scores.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gating score above which an image is accepted as a chest X-ray.
    pub gate_threshold: f32,

    /// Diagnostic score above which a pneumonia label is reported.
    pub pneumonia_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gate_threshold: 0.5,
            pneumonia_threshold: 0.5,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a threshold is outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.gate_threshold) {
            return Err(Error::InvalidParameter {
                name: "gate_threshold".to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.pneumonia_threshold) {
            return Err(Error::InvalidParameter {
                name: "pneumonia_threshold".to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }

        Ok(())
    }
}

/// Outcome label of a screening run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Pneumonia likely present.
    Pneumonia,
    /// No pneumonia detected.
    Normal,
    /// The gating model rejected the image; no diagnosis was attempted.
    NotXray,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pneumonia => write!(f, "Pneumonia"),
            Self::Normal => write!(f, "Normal"),
            Self::NotXray => write!(f, "Not an X-ray"),
        }
    }
}

/// Result of classifying one image. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Whether a diagnosis applies. False exactly when the gate rejected
    /// the image.
    pub applicable: bool,

    /// Reported label.
    pub label: Label,

    /// Probability of the *reported* label, not of the positive class:
    /// for a Normal result at score s this is `1 - s`. `None` when the
    /// gate rejected the image.
    pub confidence: Option<f32>,
}

impl Classification {
    /// The gate-rejected outcome.
    #[must_use]
    pub fn not_xray() -> Self {
        Self {
            applicable: false,
            label: Label::NotXray,
            confidence: None,
        }
    }

    /// Map a raw diagnostic sigmoid score to a labeled outcome.
    fn from_diag_score(score: f32, threshold: f32) -> Self {
        let (label, confidence) = if score > threshold {
            (Label::Pneumonia, score)
        } else {
            (Label::Normal, 1.0 - score)
        };

        Self {
            applicable: true,
            label,
            confidence: Some(confidence),
        }
    }
}

/// Two-stage screening classifier.
///
/// Holds the gating and diagnostic models for the process lifetime; load
/// them once at startup and reuse the classifier across calls. Every call
/// preprocesses the image from scratch, so repeated calls on the same image
/// are independent and identical.
pub struct Classifier<G, D> {
    gating: G,
    diagnostic: D,
    config: Config,
}

impl Classifier<OnnxModel, OnnxModel> {
    /// Load both ONNX models from a store and build a classifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or either model
    /// cannot be loaded. Both models are required; there is no partial
    /// operation mode.
    pub fn from_store(store: &ModelStore, config: Config) -> Result<Self> {
        let gating = store.load_model(ModelKind::Gating)?;
        let diagnostic = store.load_model(ModelKind::Diagnostic)?;

        Self::new(gating, diagnostic, config)
    }
}

impl<G: InferenceModel, D: InferenceModel> Classifier<G, D> {
    /// Create a classifier from two already-loaded models.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(gating: G, diagnostic: D, config: Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            gating,
            diagnostic,
            config,
        })
    }

    /// Classify one image.
    ///
    /// Preprocesses the image, runs the gating model, and only if the gate
    /// passes runs the diagnostic model. The diagnostic stage is never
    /// invoked for a rejected image and its score is never blended into the
    /// gating decision.
    ///
    /// # Errors
    ///
    /// Returns an error if either invoked model fails.
    pub fn classify(&mut self, img: &DynamicImage) -> Result<Classification> {
        let tensor = image::to_tensor(img);
        self.classify_tensor(&tensor)
    }

    /// Classify an already-preprocessed input tensor.
    ///
    /// # Errors
    ///
    /// Returns an error if either invoked model fails.
    pub fn classify_tensor(&mut self, tensor: &ImageTensor) -> Result<Classification> {
        let gate_score = self.gating.infer(tensor)?;

        if gate_score <= self.config.gate_threshold {
            tracing::info!("Gate rejected image (score {gate_score:.4})");
            return Ok(Classification::not_xray());
        }

        let diag_score = self.diagnostic.infer(tensor)?;
        let result = Classification::from_diag_score(diag_score, self.config.pneumonia_threshold);

        tracing::info!(
            "Gate {gate_score:.4}, diagnostic {diag_score:.4} -> {}",
            result.label
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic model returning a fixed score and counting invocations.
    struct StubModel {
        score: f32,
        calls: usize,
    }

    impl StubModel {
        fn new(score: f32) -> Self {
            Self { score, calls: 0 }
        }
    }

    impl InferenceModel for StubModel {
        fn infer(&mut self, _input: &ImageTensor) -> Result<f32> {
            self.calls += 1;
            Ok(self.score)
        }
    }

    /// Model that always fails, for error propagation tests.
    struct FailingModel;

    impl InferenceModel for FailingModel {
        fn infer(&mut self, _input: &ImageTensor) -> Result<f32> {
            Err(Error::ShapeMismatch {
                expected: "anything".to_string(),
                actual: "nothing".to_string(),
            })
        }
    }

    fn gray_image(width: u32, height: u32) -> DynamicImage {
        let buf = ::image::ImageBuffer::from_pixel(width, height, ::image::Rgb([128u8, 128, 128]));
        DynamicImage::ImageRgb8(buf)
    }

    fn classify_with(gate: f32, diag: f32) -> (Classification, usize, usize) {
        let mut classifier =
            Classifier::new(StubModel::new(gate), StubModel::new(diag), Config::default()).unwrap();

        let result = classifier.classify(&gray_image(64, 64)).unwrap();
        (
            result,
            classifier.gating.calls,
            classifier.diagnostic.calls,
        )
    }

    #[test]
    fn test_gate_rejection_short_circuits() {
        let (result, gate_calls, diag_calls) = classify_with(0.2, 0.9);

        assert!(!result.applicable);
        assert_eq!(result.label, Label::NotXray);
        assert_eq!(result.confidence, None);
        assert_eq!(gate_calls, 1);
        assert_eq!(diag_calls, 0);
    }

    #[test]
    fn test_gate_boundary_is_rejected() {
        // Exactly at the threshold does not pass the gate.
        let (result, _, diag_calls) = classify_with(0.5, 0.9);

        assert_eq!(result.label, Label::NotXray);
        assert_eq!(diag_calls, 0);
    }

    #[test]
    fn test_pneumonia_confidence_is_raw_score() {
        let (result, _, _) = classify_with(0.9, 0.7);

        assert!(result.applicable);
        assert_eq!(result.label, Label::Pneumonia);
        assert!((result.confidence.unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_normal_confidence_is_complement() {
        let (result, _, _) = classify_with(0.9, 0.3);

        assert!(result.applicable);
        assert_eq!(result.label, Label::Normal);
        assert!((result.confidence.unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_diagnostic_boundary_is_normal() {
        // Exactly at the threshold falls to Normal with confidence 0.5.
        let (result, _, _) = classify_with(0.9, 0.5);

        assert_eq!(result.label, Label::Normal);
        assert!((result.confidence.unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_end_to_end_gray_image() {
        let mut classifier =
            Classifier::new(StubModel::new(0.9), StubModel::new(0.2), Config::default()).unwrap();

        let result = classifier.classify(&gray_image(100, 100)).unwrap();

        assert!(result.applicable);
        assert_eq!(result.label, Label::Normal);
        assert!((result.confidence.unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let mut classifier =
            Classifier::new(StubModel::new(0.9), StubModel::new(0.7), Config::default()).unwrap();

        let img = gray_image(100, 100);
        let first = classifier.classify(&img).unwrap();
        let second = classifier.classify(&img).unwrap();

        assert_eq!(first, second);
        assert_eq!(classifier.gating.calls, 2);
        assert_eq!(classifier.diagnostic.calls, 2);
    }

    #[test]
    fn test_gate_failure_propagates() {
        let mut classifier =
            Classifier::new(FailingModel, StubModel::new(0.9), Config::default()).unwrap();

        assert!(classifier.classify(&gray_image(32, 32)).is_err());
        assert_eq!(classifier.diagnostic.calls, 0);
    }

    #[test]
    fn test_config_rejects_out_of_range_thresholds() {
        let config = Config {
            gate_threshold: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            pneumonia_threshold: -0.1,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Pneumonia.to_string(), "Pneumonia");
        assert_eq!(Label::Normal.to_string(), "Normal");
        assert_eq!(Label::NotXray.to_string(), "Not an X-ray");
    }
}
