use std::path::PathBuf;

use crate::constants::{CLIP_IMAGE_SIZE, CLIP_MAX_TEXT_TOKENS, DEFAULT_EMBEDDING_DIM};
use crate::embedding::error::EmbeddingError;

/// Weights file expected inside the model directory.
pub const CLIP_WEIGHTS_FILENAME: &str = "model.safetensors";
/// Tokenizer file expected inside the model directory.
pub const CLIP_TOKENIZER_FILENAME: &str = "tokenizer.json";

#[derive(Debug, Clone)]
/// Configuration for [`ClipEmbedder`](super::ClipEmbedder).
pub struct ClipConfig {
    /// Directory holding `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Output embedding dimension (projection size).
    pub embedding_dim: usize,
    /// Max text tokens, including the start/end markers.
    pub max_text_tokens: usize,
    /// Square input resolution for the vision tower.
    pub image_size: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            max_text_tokens: CLIP_MAX_TEXT_TOKENS,
            image_size: CLIP_IMAGE_SIZE,
            testing_stub: false,
        }
    }
}

impl ClipConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Overrides the output dimension.
    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join(CLIP_WEIGHTS_FILENAME)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(CLIP_TOKENIZER_FILENAME)
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be non-zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.max_text_tokens < 2 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_text_tokens must leave room for start and end tokens".to_string(),
            });
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        for path in [self.weights_path(), self.tokenizer_path()] {
            if !path.is_file() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }
}
