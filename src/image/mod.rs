//! Image loading and tensor conversion utilities.

mod load;

pub use load::{load_image, to_tensor};

use ndarray::Array4;

/// Image tensor in NHWC format (batch, height, width, channels).
/// Values are normalized to the [0, 1] range expected by both models.
pub type ImageTensor = Array4<f32>;

/// Edge length both models expect for their square input.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;

/// Flat element count of a model input tensor (224 * 224 * 3).
pub const TENSOR_LEN: usize =
    (MODEL_INPUT_SIZE as usize) * (MODEL_INPUT_SIZE as usize) * RGB_CHANNELS;
