//! Hybrid Chunker Library
//!
//! A multi-strategy text chunking engine for RAG pipelines. Seven
//! segmentation strategies (fixed-size, sentence, semantic, structural,
//! sliding-window, topic and hybrid) share one registry, one parameter
//! resolution path and one chunk model. Several strategies can run over the
//! same document in a single call, with failures isolated per strategy.

pub mod chunkers;
pub mod error;
pub mod export;
pub mod models;
pub mod router;
pub mod selector;
pub mod stats;
pub mod types;

pub use chunkers::{ChunkDraft, DraftBatch, Strategy};
pub use error::{ChunkError, ChunkResult};
pub use export::{prepare_for_embedding, EmbeddingPayload};
pub use models::ModelContext;
pub use router::ChunkingRouter;
pub use selector::{select_best, Criterion};
pub use stats::{chunk_stats, ChunkStats};
pub use types::{
    Chunk, ChunkMetadata, ChunkingConfig, DocumentContext, ParamOverrides, StrategyKind,
    StrategyParams, StrategyResults,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chunkers::*;
    pub use crate::error::{ChunkError, ChunkResult};
    pub use crate::export::*;
    pub use crate::models::*;
    pub use crate::router::ChunkingRouter;
    pub use crate::selector::*;
    pub use crate::stats::*;
    pub use crate::types::*;
}

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default chunk overlap in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Default number of sentences per sentence-boundary chunk
pub const DEFAULT_MAX_SENTENCES: usize = 5;

/// Default minimum chunk length in characters
pub const DEFAULT_MIN_CHUNK_SIZE: usize = 200;

/// Topic clusters shorter than this are dropped
pub const DEFAULT_TOPIC_MIN_CHUNK_SIZE: usize = 50;

pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.5;

/// Sliding window size in tokens
pub const DEFAULT_WINDOW_SIZE: usize = 256;

/// Sliding window stride in tokens
pub const DEFAULT_STRIDE: usize = 128;

pub const DEFAULT_NUM_TOPICS: usize = 5;

/// Single-line paragraphs at least this long are never headers
pub const HEADER_MAX_CHARS: usize = 100;

/// Hybrid re-splits paragraphs longer than `chunk_size` times this factor
pub const HYBRID_RESPLIT_FACTOR: f64 = 1.5;
