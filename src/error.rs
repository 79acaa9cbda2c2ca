//! Custom error types for pneumoscan.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the pneumoscan library.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A model artifact is missing from the model directory.
    #[error("model artifact not found: {path}")]
    ModelNotFound { path: PathBuf },

    /// Failed to load an ONNX model.
    #[error("failed to load ONNX model {name}: {source}")]
    ModelLoad {
        name: String,
        #[source]
        source: ort::Error,
    },

    /// Model inference failed.
    #[error("model inference failed: {source}")]
    Inference {
        #[source]
        source: ort::Error,
    },

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Failed to render or write a screening report.
    #[error("failed to generate report: {reason}")]
    Report { reason: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pneumoscan operations.
pub type Result<T> = std::result::Result<T, Error>;
