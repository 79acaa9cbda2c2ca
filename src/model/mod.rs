//! Model artifact resolution and the inference abstraction.

mod onnx;
mod store;

pub use onnx::OnnxModel;
pub use store::ModelStore;

use crate::error::Result;
use crate::image::ImageTensor;

/// The two models the screening pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Gating model - decides whether an image is a chest X-ray at all.
    Gating,
    /// Diagnostic model - scores pneumonia likelihood on a confirmed X-ray.
    Diagnostic,
}

impl ModelKind {
    /// Get the artifact filename for this model kind.
    ///
    /// These match the filenames the models are packaged under; swapping in
    /// a retrained artifact under the same name is supported as long as the
    /// input/output shape contract holds.
    #[must_use]
    pub const fn filename(&self) -> &'static str {
        match self {
            Self::Gating => "xray_preclassifier.onnx",
            Self::Diagnostic => "pneumonia_model.onnx",
        }
    }
}

/// A single-output image classifier.
///
/// Both pipeline stages consume the same fixed-shape input tensor and
/// produce exactly one sigmoid score in [0, 1]. Implemented by [`OnnxModel`]
/// for the real runtime and by deterministic stubs in tests.
pub trait InferenceModel {
    /// Run one forward pass and return the raw sigmoid score.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the model violates the
    /// one-float output contract.
    fn infer(&mut self, input: &ImageTensor) -> Result<f32>;
}
