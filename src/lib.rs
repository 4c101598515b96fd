//! Lostfound library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`User`], [`Item`], [`Match`] - Stored records
//! - [`Store`], [`UnitOfWork`], [`MemoryStore`] - Transactional storage
//!
//! ## Embedding & Scoring
//! - [`ClipEmbedder`], [`ClipConfig`] - Text and image embeddings in one space
//! - [`SimilarityScorer`], [`ScoringWeights`] - Weighted image/text similarity
//!
//! ## Matching & Rewards
//! - [`MatchEngine`], [`MatchThreshold`], [`MatchReport`] - Opposite-pool matching
//! - [`MatchLifecycle`], [`ReturnOutcome`] - Return confirmation and finder reward
//!
//! ## Application
//! - [`LostFoundService`] - Report, notify, return, dashboards
//! - [`gateway`] - HTTP router over the service

pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod lifecycle;
pub mod matching;
pub mod scoring;
pub mod service;
pub mod storage;

pub use config::{Config, ConfigError, SNAPSHOT_FILENAME};
pub use constants::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_MATCH_THRESHOLD, DEFAULT_REWARD_COINS, DimConfig,
    DimValidationError, validate_embedding_dim,
};
pub use embedding::{
    ClipConfig, ClipEmbedder, EmbeddingError, EmbeddingResult, EmbeddingVector, ImageEmbedder,
    MultimodalEmbedder, TextEmbedder,
};
pub use lifecycle::{LifecycleError, LifecycleResult, MatchLifecycle, ReturnOutcome};
pub use matching::{
    MatchEngine, MatchReport, MatchThreshold, MatchingError, MatchingResult, PassSkipped,
};
pub use scoring::{
    InvalidWeights, ScoringError, ScoringResult, ScoringWeights, SimilarityBreakdown,
    SimilarityScorer, cosine_similarity,
};
pub use service::{
    AdminOverview, Dashboard, FinderContact, ItemView, LostFoundService, MatchNotification,
    MatchingStatus, RegisterRequest, ReportOutcome, ReportRequest, ServiceError, ServiceResult,
    ServiceSettings,
};
pub use storage::{
    GeoPoint, Item, ItemId, ItemStatus, ItemType, Match, MatchId, MatchStatus, MemoryStore,
    NewItem, NewMatch, NewUser, Store, StoreError, StoreResult, UnitOfWork, User, UserId,
};
