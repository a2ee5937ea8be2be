//! Size statistics over a chunk list.

use serde::{Deserialize, Serialize};

use crate::types::Chunk;

/// Character-length statistics of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkStats {
    pub total_chunks: usize,
    pub total_text_length: usize,
    pub average_chunk_size: f64,
    pub min_chunk_size: usize,
    pub max_chunk_size: usize,
}

impl ChunkStats {
    /// Compute statistics; an empty list yields all zeros.
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        if chunks.is_empty() {
            return Self::default();
        }

        let sizes: Vec<usize> = chunks.iter().map(Chunk::len).collect();
        let total_text_length: usize = sizes.iter().sum();

        Self {
            total_chunks: chunks.len(),
            total_text_length,
            average_chunk_size: total_text_length as f64 / chunks.len() as f64,
            min_chunk_size: sizes.iter().copied().min().unwrap_or(0),
            max_chunk_size: sizes.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Shorthand for [`ChunkStats::from_chunks`].
pub fn chunk_stats(chunks: &[Chunk]) -> ChunkStats {
    ChunkStats::from_chunks(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::chunk_of;
    use crate::types::StrategyKind;

    #[test]
    fn test_empty_is_all_zero() {
        assert_eq!(chunk_stats(&[]), ChunkStats::default());
    }

    #[test]
    fn test_sizes_are_counted_in_chars() {
        let chunks = vec![
            chunk_of(StrategyKind::FixedSize, "abcd"),
            chunk_of(StrategyKind::FixedSize, "héllo wörld"),
            chunk_of(StrategyKind::FixedSize, "xy"),
        ];
        let stats = chunk_stats(&chunks);

        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.total_text_length, 17);
        assert_eq!(stats.min_chunk_size, 2);
        assert_eq!(stats.max_chunk_size, 11);
        assert!((stats.average_chunk_size - 17.0 / 3.0).abs() < 1e-9);
    }
}
