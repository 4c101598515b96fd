//! Embedder capabilities consumed by the report flow.

use tracing::warn;

use super::error::EmbeddingError;
use super::vector::EmbeddingVector;

/// Produces text embeddings in the shared vector space.
pub trait TextEmbedder: Send + Sync {
    fn embed_text(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;
}

/// Produces image embeddings (from encoded image bytes) in the shared vector space.
pub trait ImageEmbedder: Send + Sync {
    fn embed_image(&self, image: &[u8]) -> Result<EmbeddingVector, EmbeddingError>;
}

/// A text + image embedder sharing one output dimension.
///
/// Loaded once at startup and shared behind an `Arc`.
pub trait MultimodalEmbedder: TextEmbedder + ImageEmbedder {
    /// Dimension of every vector this embedder returns.
    fn embedding_dim(&self) -> usize;

    /// Returns `true` when running without real model weights.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Embeds `text`, mapping any failure to an absent embedding (logged).
pub fn embed_text_or_absent<E>(embedder: &E, text: &str) -> Option<EmbeddingVector>
where
    E: TextEmbedder + ?Sized,
{
    match embedder.embed_text(text) {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!(error = %e, text_len = text.len(), "Text embedding failed; item will not be matchable");
            None
        }
    }
}

/// Embeds `image`, mapping any failure to an absent embedding (logged).
pub fn embed_image_or_absent<E>(embedder: &E, image: &[u8]) -> Option<EmbeddingVector>
where
    E: ImageEmbedder + ?Sized,
{
    match embedder.embed_image(image) {
        Ok(vector) => Some(vector),
        Err(e) => {
            warn!(error = %e, image_bytes = image.len(), "Image embedding failed; item will not be matchable");
            None
        }
    }
}
