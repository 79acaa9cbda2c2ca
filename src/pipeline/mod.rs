//! Two-stage X-ray screening pipeline.

mod classifier;

pub use classifier::{Classification, Classifier, Config, Label};
