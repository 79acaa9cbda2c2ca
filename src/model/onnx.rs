//! ONNX Runtime binding for the inference abstraction.

use ort::session::Session;
use ort::value::TensorRef;

use crate::error::{Error, Result};
use crate::image::{ImageTensor, MODEL_INPUT_SIZE, RGB_CHANNELS};

use super::{InferenceModel, ModelKind};

/// A loaded ONNX model producing one sigmoid score per forward pass.
///
/// Wraps an [`ort::session::Session`]; the session is read-only after load
/// and reused across sequential calls. `run` needs `&mut self`, which is why
/// [`InferenceModel::infer`] does too.
pub struct OnnxModel {
    session: Session,
    name: &'static str,
}

impl OnnxModel {
    /// Wrap an already-built session.
    pub(crate) fn new(session: Session, kind: ModelKind) -> Self {
        Self {
            session,
            name: kind.filename(),
        }
    }

    /// Artifact filename this model was loaded from.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }
}

impl InferenceModel for OnnxModel {
    fn infer(&mut self, input: &ImageTensor) -> Result<f32> {
        let size = MODEL_INPUT_SIZE as usize;
        if input.dim() != (1, size, size, RGB_CHANNELS) {
            return Err(Error::ShapeMismatch {
                expected: format!("(1, {size}, {size}, {RGB_CHANNELS})"),
                actual: format!("{:?}", input.dim()),
            });
        }

        let input_value =
            TensorRef::from_array_view(input).map_err(|source| Error::Inference { source })?;

        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|source| Error::Inference { source })?;

        // Get first output
        let output = outputs
            .values()
            .next()
            .ok_or_else(|| Error::ShapeMismatch {
                expected: "one sigmoid output".to_string(),
                actual: "no output".to_string(),
            })?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|source| Error::Inference { source })?;

        // Both models end in a single sigmoid unit, usually exported as (1, 1).
        if data.len() != 1 {
            return Err(Error::ShapeMismatch {
                expected: "1 element".to_string(),
                actual: format!("{} elements (shape {shape:?})", data.len()),
            });
        }

        tracing::debug!("{} score: {:.4}", self.name, data[0]);

        Ok(data[0])
    }
}
