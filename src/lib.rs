//! # pneumoscan
//!
//! Two-stage on-device chest X-ray screening for pneumonia.
//!
//! A gating model first decides whether an image is a chest X-ray at all;
//! only accepted images are scored by the diagnostic model. Both models are
//! ONNX artifacts loaded once at startup, consuming a fixed 224x224 RGB
//! tensor and producing one sigmoid score.
//!
//! ## Example
//!
//! ```no_run
//! use pneumoscan::{Classifier, Config, ModelStore};
//!
//! # fn main() -> pneumoscan::Result<()> {
//! let store = ModelStore::with_dir("models");
//! let mut classifier = Classifier::from_store(&store, Config::default())?;
//!
//! let img = pneumoscan::image::load_image("chest.png")?;
//! let result = classifier.classify(&img)?;
//!
//! println!("{}", result.label);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod model;
pub mod pipeline;
pub mod report;

pub use error::{Error, Result};
pub use model::{InferenceModel, ModelKind, ModelStore, OnnxModel};
pub use pipeline::{Classification, Classifier, Config, Label};
