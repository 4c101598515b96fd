//! Embedding generation for reported items.
//!
//! - [`clip`] embeds titles/descriptions and photos into one vector space.
//! - [`embedder`] holds the capability traits the report flow depends on.

/// CLIP multimodal embedder.
pub mod clip;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Embedder traits and failure-to-absent helpers.
pub mod embedder;
mod error;
/// Shared embedding vector type.
pub mod vector;

pub use clip::{ClipConfig, ClipEmbedder};
pub use embedder::{
    ImageEmbedder, MultimodalEmbedder, TextEmbedder, embed_image_or_absent, embed_text_or_absent,
};
pub use error::{EmbeddingError, EmbeddingResult};
pub use vector::EmbeddingVector;
