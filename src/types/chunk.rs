//! Chunk type definitions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{SizeUnit, StrategyKind};

/// A chunk of text produced by one segmentation strategy.
///
/// Chunks are only created by sealing a strategy's batch (see
/// [`DraftBatch::seal`](crate::chunkers::DraftBatch::seal)); once a batch is
/// handed back to the caller nothing in this crate touches it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk text
    pub text: String,

    /// Metadata describing where the chunk came from
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Length of the chunk text in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Shorthand for the chunk id.
    pub fn id(&self) -> &str {
        &self.metadata.id
    }
}

/// Metadata associated with a chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Deterministic identifier: strategy name plus a content digest
    pub id: String,

    /// Algorithm that produced the chunk
    pub strategy: StrategyKind,

    /// Position of this chunk within its batch (0-indexed)
    pub chunk_index: usize,

    /// Starting character offset in the original text
    pub start_position: usize,

    /// Ending character offset (exclusive) in the original text
    pub end_position: usize,

    /// Number of tokens in the chunk text
    pub token_count: usize,

    /// Number of sentences in the chunk text
    pub sentence_count: usize,

    /// Cohesion score reported by the producing strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f32>,

    /// Cluster label (topic-based only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_cluster: Option<usize>,

    /// Strategy-specific auxiliary facts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_info: Option<OverlapInfo>,

    /// Number of chunks in the batch this chunk belongs to
    pub total_chunks: usize,

    /// Caller-supplied file correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    /// Caller-supplied project correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Additional caller metadata, passed through unexamined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

/// Strategy-specific facts about how a chunk was cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlapInfo {
    /// A fixed-size window
    FixedWindow {
        chunk_size: usize,
        overlap: usize,
        unit: SizeUnit,
    },
    /// A sliding token window
    SlidingWindow {
        window_size: usize,
        stride: usize,
        window_index: usize,
    },
    /// A structural paragraph
    Paragraph { is_header: bool },
    /// A hybrid segment, either passed through or re-split by size
    Hybrid {
        segment_index: usize,
        resplit: bool,
        is_header: bool,
    },
}

impl OverlapInfo {
    /// Whether the chunk was detected as a header.
    pub fn is_header(&self) -> bool {
        match self {
            OverlapInfo::Paragraph { is_header } => *is_header,
            OverlapInfo::Hybrid { is_header, .. } => *is_header,
            _ => false,
        }
    }
}

/// How chunk ids are derived.
///
/// With [`IdScheme::ContentDigest`] two chunks of one batch with identical
/// text share an id. [`IdScheme::ContentDigestWithIndex`] folds the chunk
/// index in so every id in a batch is distinct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// `{strategy}_{hex8}`
    #[default]
    #[serde(alias = "digest")]
    ContentDigest,
    /// `{strategy}_{hex8}_{index}`
    #[serde(alias = "indexed")]
    ContentDigestWithIndex,
}

impl std::str::FromStr for IdScheme {
    type Err = crate::ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "content_digest" | "digest" => Ok(IdScheme::ContentDigest),
            "content_digest_with_index" | "indexed" => Ok(IdScheme::ContentDigestWithIndex),
            other => Err(crate::ChunkError::invalid(format!("unknown id scheme: {}", other))),
        }
    }
}

/// First eight hex characters of the SHA-256 digest of `text`.
pub fn content_digest_prefix(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    hash[..8].to_string()
}

/// Build the id of a chunk.
pub fn chunk_id(strategy: StrategyKind, text: &str, index: usize, scheme: IdScheme) -> String {
    let digest = content_digest_prefix(text);
    match scheme {
        IdScheme::ContentDigest => format!("{}_{}", strategy, digest),
        IdScheme::ContentDigestWithIndex => format!("{}_{}_{}", strategy, digest, index),
    }
}
