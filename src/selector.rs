//! Reduce a multi-strategy result to a single chunk list.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChunkError, ChunkResult};
use crate::types::{Chunk, StrategyKind, StrategyResults};

/// How [`select_best`] picks chunks out of a result map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    /// First third (at least one) of every strategy's chunks
    Balanced,
    /// semantic_similarity, then topic_based
    Semantic,
    /// structural, then sentence_boundary
    Structural,
    /// fixed_size, then sliding_window
    Size,
    /// Whatever strategy comes first
    #[default]
    FirstAvailable,
}

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Balanced => "balanced",
            Criterion::Semantic => "semantic",
            Criterion::Structural => "structural",
            Criterion::Size => "size",
            Criterion::FirstAvailable => "first_available",
        }
    }

    /// Parse a criterion name; anything unrecognized means first-available.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or(Criterion::FirstAvailable)
    }

    /// Strategies tried in order before falling back to the first available.
    fn preferences(&self) -> &'static [StrategyKind] {
        match self {
            Criterion::Semantic => &[StrategyKind::SemanticSimilarity, StrategyKind::TopicBased],
            Criterion::Structural => &[StrategyKind::Structural, StrategyKind::SentenceBoundary],
            Criterion::Size => &[StrategyKind::FixedSize, StrategyKind::SlidingWindow],
            Criterion::Balanced | Criterion::FirstAvailable => &[],
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = ChunkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "balanced" => Ok(Criterion::Balanced),
            "semantic" => Ok(Criterion::Semantic),
            "structural" => Ok(Criterion::Structural),
            "size" => Ok(Criterion::Size),
            "first_available" | "first" => Ok(Criterion::FirstAvailable),
            other => Err(ChunkError::invalid(format!("unknown selection criterion: {}", other))),
        }
    }
}

/// Pick one chunk list out of `results` according to `criterion`.
///
/// The chunks are cloned; `results` is left untouched. An empty map is
/// rejected with [`ChunkError::InvalidParameter`].
pub fn select_best(results: &StrategyResults, criterion: Criterion) -> ChunkResult<Vec<Chunk>> {
    let (first_kind, first_chunks) = results
        .first()
        .ok_or_else(|| ChunkError::invalid("cannot select from an empty result map"))?;

    if criterion == Criterion::Balanced {
        let selected: Vec<Chunk> = results
            .iter()
            .flat_map(|(_, chunks)| {
                let take = if chunks.is_empty() { 0 } else { (chunks.len() / 3).max(1) };
                chunks[..take].iter().cloned()
            })
            .collect();
        debug!(criterion = %criterion, chunks = selected.len(), "Selected chunks");
        return Ok(selected);
    }

    let (kind, chunks) = criterion
        .preferences()
        .iter()
        .find_map(|&kind| results.get(kind).map(|chunks| (kind, chunks)))
        .unwrap_or((first_kind, first_chunks));

    debug!(criterion = %criterion, strategy = %kind, chunks = chunks.len(), "Selected chunks");
    Ok(chunks.to_vec())
}
