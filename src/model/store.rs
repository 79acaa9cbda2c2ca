//! Model artifact location and session loading.

use std::path::{Path, PathBuf};

use ort::session::Session;

use crate::error::{Error, Result};

use super::{ModelKind, OnnxModel};

/// Resolves model artifacts inside a model directory and builds sessions.
///
/// Both artifacts are expected to exist before the pipeline starts; there is
/// no download or fallback path. A missing or unloadable model is fatal.
pub struct ModelStore {
    model_dir: PathBuf,
}

impl ModelStore {
    /// Create a store over the platform default model directory:
    /// - Windows: `%LOCALAPPDATA%\pneumoscan\models`
    /// - Linux: `~/.local/share/pneumoscan/models`
    /// - macOS: `~/Library/Application Support/pneumoscan/models`
    #[must_use]
    pub fn new() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            model_dir: base.join("pneumoscan").join("models"),
        }
    }

    /// Create a store over an explicit model directory.
    pub fn with_dir<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    /// Directory this store resolves artifacts in.
    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Get the path to a model artifact, verifying it exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelNotFound`] if the artifact is missing.
    pub fn model_path(&self, kind: ModelKind) -> Result<PathBuf> {
        let path = self.model_dir.join(kind.filename());

        if !path.exists() {
            return Err(Error::ModelNotFound { path });
        }

        Ok(path)
    }

    /// Load an ONNX model session.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact is missing or the session cannot be
    /// built from it.
    pub fn load_session(&self, kind: ModelKind) -> Result<Session> {
        let path = self.model_path(kind)?;

        tracing::info!("Loading {} from {}", kind.filename(), path.display());

        Session::builder()
            .map_err(|source| Error::ModelLoad {
                name: kind.filename().to_string(),
                source,
            })?
            .commit_from_file(&path)
            .map_err(|source| Error::ModelLoad {
                name: kind.filename().to_string(),
                source,
            })
    }

    /// Load a model as an [`OnnxModel`] ready for inference.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be loaded.
    pub fn load_model(&self, kind: ModelKind) -> Result<OnnxModel> {
        Ok(OnnxModel::new(self.load_session(kind)?, kind))
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}
