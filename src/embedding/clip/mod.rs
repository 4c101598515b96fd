//! CLIP embedder (text + image into one vector space).
//!
//! Use [`ClipConfig::stub`] for tests and local runs without model files.

/// CLIP configuration.
pub mod config;


pub use config::{CLIP_TOKENIZER_FILENAME, CLIP_WEIGHTS_FILENAME, ClipConfig};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip as candle_clip;
use image::imageops::FilterType;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use crate::constants::validate_embedding_dim;
use crate::embedding::device::select_device;
use crate::embedding::embedder::{ImageEmbedder, MultimodalEmbedder, TextEmbedder};
use crate::embedding::error::EmbeddingError;
use crate::embedding::vector::EmbeddingVector;

enum EmbedderBackend {
    Model {
        model: candle_clip::ClipModel,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Multimodal embedder backed by CLIP ViT-B/32 (supports stub mode).
pub struct ClipEmbedder {
    backend: EmbedderBackend,
    config: ClipConfig,
}

impl std::fmt::Debug for ClipEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("image_size", &self.config.image_size)
            .finish()
    }
}

/// Rejects configs the ViT-B/32 weights cannot serve.
fn check_model_shape(
    config: &ClipConfig,
    model: &candle_clip::ClipConfig,
) -> Result<(), EmbeddingError> {
    for projection_dim in [
        model.text_config.projection_dim,
        model.vision_config.projection_dim,
    ] {
        if projection_dim != config.embedding_dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: projection_dim,
                actual: config.embedding_dim,
            });
        }
    }

    if model.image_size != config.image_size {
        return Err(EmbeddingError::InvalidConfig {
            reason: format!(
                "image_size ({}) does not match the model's input size ({})",
                config.image_size, model.image_size
            ),
        });
    }

    Ok(())
}

impl ClipEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: ClipConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("CLIP embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let device = select_device();
        let (model, tokenizer) = Self::load_model(&config, &device)?;

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            image_size = config.image_size,
            "CLIP model loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
        })
    }

    fn load_model(
        config: &ClipConfig,
        device: &Device,
    ) -> Result<(candle_clip::ClipModel, Tokenizer), EmbeddingError> {
        let clip_config = candle_clip::ClipConfig::vit_base_patch32();
        check_model_shape(config, &clip_config)?;

        let tokenizer = Tokenizer::from_file(config.tokenizer_path()).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("Failed to load tokenizer: {}", e),
            }
        })?;

        // SAFETY: the weights file is opened read-only and not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[config.weights_path()], DType::F32, device)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to map CLIP weights: {}", e),
        })?;

        let model = candle_clip::ClipModel::new(vb, &clip_config).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to build CLIP model: {}", e),
            }
        })?;

        Ok((model, tokenizer))
    }

    /// Returns the configured output embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    /// Returns the embedder configuration.
    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    fn text_with_model(
        &self,
        text: &str,
        model: &candle_clip::ClipModel,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let mut tokens: Vec<u32> = encoding.get_ids().to_vec();
        if tokens.is_empty() {
            return Err(EmbeddingError::TokenizationFailed {
                reason: "tokenizer produced no tokens".to_string(),
            });
        }

        // Pooling reads the end-of-text position, so it must survive truncation.
        let max = self.config.max_text_tokens;
        if tokens.len() > max {
            let end = tokens[tokens.len() - 1];
            tokens.truncate(max);
            tokens[max - 1] = end;
        }

        debug!(
            text_len = text.len(),
            token_count = tokens.len(),
            "Generating CLIP text embedding"
        );

        let input_ids = Tensor::new(&tokens[..], device)?.unsqueeze(0)?;
        let features = model.get_text_features(&input_ids)?;

        self.finish(features)
    }

    fn image_with_model(
        &self,
        bytes: &[u8],
        model: &candle_clip::ClipModel,
        device: &Device,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        let size = self.config.image_size;
        let decoded = image::load_from_memory(bytes)?;
        let rgb = decoded
            .resize_to_fill(size as u32, size as u32, FilterType::Triangle)
            .to_rgb8();

        debug!(
            source_width = decoded.width(),
            source_height = decoded.height(),
            "Generating CLIP image embedding"
        );

        // HWC u8 -> CHW f32 scaled to [-1, 1], batch of one.
        let pixels = Tensor::from_vec(rgb.into_raw(), (size, size, 3), device)?
            .permute((2, 0, 1))?
            .to_dtype(DType::F32)?
            .affine(2.0 / 255.0, -1.0)?
            .unsqueeze(0)?;
        let features = model.get_image_features(&pixels)?;

        self.finish(features)
    }

    fn finish(&self, features: Tensor) -> Result<EmbeddingVector, EmbeddingError> {
        let values = features.squeeze(0)?.to_vec1::<f32>()?;
        validate_embedding_dim(values.len(), self.config.embedding_dim).map_err(|_| {
            EmbeddingError::DimensionMismatch {
                expected: self.config.embedding_dim,
                actual: values.len(),
            }
        })?;
        EmbeddingVector::normalized(values)
    }

    fn embed_stub(&self, domain: &str, input: &[u8]) -> Result<EmbeddingVector, EmbeddingError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(domain.as_bytes());
        hasher.update(input);
        let digest = hasher.finalize();

        let mut seed_bytes = [0u8; 8];
        seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
        let mut state = u64::from_le_bytes(seed_bytes);

        let mut values = Vec::with_capacity(self.config.embedding_dim);
        for _ in 0..self.config.embedding_dim {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            values.push(value);
        }

        EmbeddingVector::normalized(values)
    }
}

impl TextEmbedder for ClipEmbedder {
    fn embed_text(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput {
                reason: "text is blank".to_string(),
            });
        }

        match &self.backend {
            EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.text_with_model(text, model, tokenizer, device),
            EmbedderBackend::Stub => self.embed_stub("text", text.as_bytes()),
        }
    }
}

impl ImageEmbedder for ClipEmbedder {
    fn embed_image(&self, image: &[u8]) -> Result<EmbeddingVector, EmbeddingError> {
        if image.is_empty() {
            return Err(EmbeddingError::InvalidInput {
                reason: "image is empty".to_string(),
            });
        }

        match &self.backend {
            EmbedderBackend::Model { model, device, .. } => {
                self.image_with_model(image, model, device)
            }
            EmbedderBackend::Stub => self.embed_stub("image", image),
        }
    }
}

impl MultimodalEmbedder for ClipEmbedder {
    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn is_stub(&self) -> bool {
        ClipEmbedder::is_stub(self)
    }
}
