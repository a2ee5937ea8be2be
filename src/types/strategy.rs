//! Strategy identifiers and parameter records.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, ChunkResult};
use crate::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_SENTENCES, DEFAULT_MIN_CHUNK_SIZE,
    DEFAULT_NUM_TOPICS, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_STRIDE, DEFAULT_WINDOW_SIZE,
};

/// The segmentation algorithms the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Fixed windows of characters or tokens with overlap
    #[serde(alias = "fixed")]
    FixedSize,
    /// Groups of whole sentences
    #[serde(alias = "sentence")]
    SentenceBoundary,
    /// Greedy grouping of sentences by embedding similarity
    #[serde(alias = "semantic")]
    SemanticSimilarity,
    /// Blank-line separated paragraphs, with header detection
    #[serde(alias = "paragraph")]
    Structural,
    /// Token windows advancing by a stride
    #[serde(alias = "sliding")]
    SlidingWindow,
    /// Sentences clustered into topics
    #[serde(alias = "topic")]
    TopicBased,
    /// Structural segmentation with oversized segments re-split by size
    Hybrid,
}

impl StrategyKind {
    /// Every strategy, in registration order.
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::FixedSize,
        StrategyKind::SentenceBoundary,
        StrategyKind::SemanticSimilarity,
        StrategyKind::Structural,
        StrategyKind::SlidingWindow,
        StrategyKind::TopicBased,
        StrategyKind::Hybrid,
    ];

    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::FixedSize => "fixed_size",
            StrategyKind::SentenceBoundary => "sentence_boundary",
            StrategyKind::SemanticSimilarity => "semantic_similarity",
            StrategyKind::Structural => "structural",
            StrategyKind::SlidingWindow => "sliding_window",
            StrategyKind::TopicBased => "topic_based",
            StrategyKind::Hybrid => "hybrid",
        }
    }

    /// Whether the strategy needs the embedder (and possibly the clusterer).
    pub fn uses_embeddings(&self) -> bool {
        matches!(self, StrategyKind::SemanticSimilarity | StrategyKind::TopicBased)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "fixed_size" | "fixed" => Ok(StrategyKind::FixedSize),
            "sentence_boundary" | "sentence" => Ok(StrategyKind::SentenceBoundary),
            "semantic_similarity" | "semantic" => Ok(StrategyKind::SemanticSimilarity),
            "structural" | "paragraph" => Ok(StrategyKind::Structural),
            "sliding_window" | "sliding" => Ok(StrategyKind::SlidingWindow),
            "topic_based" | "topic" => Ok(StrategyKind::TopicBased),
            "hybrid" => Ok(StrategyKind::Hybrid),
            _ => Err(ChunkError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Unit in which fixed-size windows are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    /// Unicode scalar values
    #[default]
    Characters,
    /// Tokenizer tokens
    Tokens,
}

/// Finalized, validated parameters for one strategy invocation.
///
/// Every strategy reads only the fields it cares about; the rest are carried
/// along so that delegation (e.g. semantic falling back to fixed-size) can
/// reuse the same record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Window length for fixed-size and hybrid re-splitting
    pub chunk_size: usize,
    /// Shared span between consecutive fixed-size windows
    pub overlap: usize,
    /// Unit of `chunk_size` / `overlap`
    pub unit: SizeUnit,
    /// Sentences per sentence-boundary chunk
    pub max_sentences: usize,
    /// Character length that closes a sentence group / drops a topic cluster
    pub min_chunk_size: usize,
    /// Upper bound (chars) on a semantic chunk
    pub max_chunk_size: usize,
    /// Minimum cosine similarity to the running centroid
    pub similarity_threshold: f32,
    /// Sliding window length in tokens
    pub window_size: usize,
    /// Sliding window advance in tokens
    pub stride: usize,
    /// Requested number of topic clusters
    pub num_topics: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
            unit: SizeUnit::Characters,
            max_sentences: DEFAULT_MAX_SENTENCES,
            min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
            max_chunk_size: DEFAULT_CHUNK_SIZE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            window_size: DEFAULT_WINDOW_SIZE,
            stride: DEFAULT_STRIDE,
            num_topics: DEFAULT_NUM_TOPICS,
        }
    }
}

impl StrategyParams {
    /// Layer `overrides` on top of these parameters; an override wins per key.
    pub fn merged(mut self, overrides: &ParamOverrides) -> ChunkResult<Self> {
        if let Some(v) = overrides.chunk_size {
            self.chunk_size = non_negative("chunk_size", v)?;
        }
        if let Some(v) = overrides.overlap {
            self.overlap = non_negative("overlap", v)?;
        }
        if let Some(unit) = overrides.unit {
            self.unit = unit;
        }
        if let Some(v) = overrides.max_sentences {
            self.max_sentences = non_negative("max_sentences", v)?;
        }
        if let Some(v) = overrides.min_chunk_size {
            self.min_chunk_size = non_negative("min_chunk_size", v)?;
        }
        if let Some(v) = overrides.max_chunk_size {
            self.max_chunk_size = non_negative("max_chunk_size", v)?;
        }
        if let Some(v) = overrides.similarity_threshold {
            self.similarity_threshold = v;
        }
        if let Some(v) = overrides.window_size {
            self.window_size = non_negative("window_size", v)?;
        }
        if let Some(v) = overrides.stride {
            self.stride = non_negative("stride", v)?;
        }
        if let Some(v) = overrides.num_topics {
            self.num_topics = non_negative("num_topics", v)?;
        }
        Ok(self)
    }

    /// Check the fields `kind` reads directly.
    pub fn validate(&self, kind: StrategyKind) -> ChunkResult<()> {
        match kind {
            StrategyKind::FixedSize | StrategyKind::Hybrid => self.validate_window(),
            StrategyKind::SentenceBoundary => positive("max_sentences", self.max_sentences),
            StrategyKind::SemanticSimilarity => {
                positive("max_chunk_size", self.max_chunk_size)?;
                if !(-1.0..=1.0).contains(&self.similarity_threshold) {
                    return Err(ChunkError::invalid(format!(
                        "similarity_threshold {} must lie in [-1, 1]",
                        self.similarity_threshold
                    )));
                }
                Ok(())
            }
            StrategyKind::Structural => Ok(()),
            StrategyKind::SlidingWindow => {
                positive("window_size", self.window_size)?;
                positive("stride", self.stride)
            }
            StrategyKind::TopicBased => {
                positive("num_topics", self.num_topics)?;
                positive("max_sentences", self.max_sentences)
            }
        }
    }

    /// A window must advance: `overlap < chunk_size`.
    pub fn validate_window(&self) -> ChunkResult<()> {
        positive("chunk_size", self.chunk_size)?;
        if self.overlap >= self.chunk_size {
            return Err(ChunkError::invalid(format!(
                "overlap {} must be smaller than chunk_size {}",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn non_negative(name: &str, value: i64) -> ChunkResult<usize> {
    usize::try_from(value)
        .map_err(|_| ChunkError::invalid(format!("{} must not be negative (got {})", name, value)))
}

fn positive(name: &str, value: usize) -> ChunkResult<()> {
    if value == 0 {
        return Err(ChunkError::invalid(format!("{} must be greater than zero", name)));
    }
    Ok(())
}

/// Per-call parameter overrides; unset fields keep the strategy default.
///
/// Sizes are signed so that negative input coming from callers is reported
/// as an invalid parameter when the record is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<SizeUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sentences: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_chunk_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chunk_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stride: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_topics: Option<i64>,
}

impl ParamOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size.
    pub fn with_chunk_size(mut self, size: i64) -> Self {
        self.chunk_size = Some(size);
        self
    }

    /// Set the overlap.
    pub fn with_overlap(mut self, overlap: i64) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Measure fixed-size windows in `unit`.
    pub fn with_unit(mut self, unit: SizeUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_max_sentences(mut self, n: i64) -> Self {
        self.max_sentences = Some(n);
        self
    }

    pub fn with_min_chunk_size(mut self, size: i64) -> Self {
        self.min_chunk_size = Some(size);
        self
    }

    pub fn with_max_chunk_size(mut self, size: i64) -> Self {
        self.max_chunk_size = Some(size);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }

    /// Set sliding window length and stride together.
    pub fn with_window(mut self, window_size: i64, stride: i64) -> Self {
        self.window_size = Some(window_size);
        self.stride = Some(stride);
        self
    }

    pub fn with_num_topics(mut self, n: i64) -> Self {
        self.num_topics = Some(n);
        self
    }

    /// Layer `other` over `self`; keys set in `other` win.
    pub fn layered(&self, other: &ParamOverrides) -> ParamOverrides {
        ParamOverrides {
            chunk_size: other.chunk_size.or(self.chunk_size),
            overlap: other.overlap.or(self.overlap),
            unit: other.unit.or(self.unit),
            max_sentences: other.max_sentences.or(self.max_sentences),
            min_chunk_size: other.min_chunk_size.or(self.min_chunk_size),
            max_chunk_size: other.max_chunk_size.or(self.max_chunk_size),
            similarity_threshold: other.similarity_threshold.or(self.similarity_threshold),
            window_size: other.window_size.or(self.window_size),
            stride: other.stride.or(self.stride),
            num_topics: other.num_topics.or(self.num_topics),
        }
    }
}

/// Overrides keyed by the strategy they apply to.
pub type PerStrategyOverrides = HashMap<StrategyKind, ParamOverrides>;
