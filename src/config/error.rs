//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::constants::DimValidationError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A numeric setting could not be parsed.
    #[error("invalid value '{value}' for {name}")]
    InvalidNumber { name: &'static str, value: String },

    /// A boolean setting was not one of the accepted spellings.
    #[error("invalid boolean '{value}' for {name} (expected true/false/1/0)")]
    InvalidBool { name: &'static str, value: String },

    /// Match threshold outside the cosine range.
    #[error("match threshold {value} must be a finite number in [-1, 1]")]
    ThresholdOutOfRange { value: f32 },

    /// Scoring weights are negative or do not sum to 1.
    #[error("invalid scoring weights (image={image}, text={text}): {reason}")]
    InvalidWeights {
        image: f32,
        text: f32,
        reason: &'static str,
    },

    /// Embedding dimension rejected.
    #[error("invalid embedding dimension: {0}")]
    InvalidEmbeddingDim(#[from] DimValidationError),

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
