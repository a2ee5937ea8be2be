//! Sentence-based chunker that respects sentence boundaries.

use super::base::{
    group_char_len, group_draft, sentence_spans, CharIndex, DraftBatch, SentenceSpan, Strategy,
};
use crate::error::ChunkResult;
use crate::models::ModelContext;
use crate::types::{StrategyKind, StrategyParams};

/// Sentence-based chunker that groups whole sentences into chunks.
///
/// A pending group is emitted once it holds `max_sentences` sentences, or
/// once it holds more than one sentence and reaches `min_chunk_size`
/// characters. Whatever is left at the end becomes a final, possibly short,
/// chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceChunker;

impl SentenceChunker {
    /// Create a new sentence chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SentenceChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SentenceBoundary
    }

    fn description(&self) -> &'static str {
        "Groups whole sentences into chunks by count and minimum length"
    }

    fn segment(
        &self,
        text: &str,
        params: &StrategyParams,
        models: &ModelContext,
    ) -> ChunkResult<DraftBatch> {
        if text.trim().is_empty() {
            return Ok(DraftBatch::empty(self.kind()));
        }

        let index = CharIndex::new(text);
        let sentences = sentence_spans(&index, models)?;

        let mut drafts = Vec::new();
        let mut pending: Vec<&SentenceSpan> = Vec::new();

        for sentence in &sentences {
            pending.push(sentence);

            let full = pending.len() >= params.max_sentences;
            let long_enough =
                pending.len() > 1 && group_char_len(&pending) >= params.min_chunk_size;
            if full || long_enough {
                drafts.push(group_draft(&index, &pending));
                pending.clear();
            }
        }

        // Flush the remainder
        if !pending.is_empty() {
            drafts.push(group_draft(&index, &pending));
        }

        Ok(DraftBatch::new(self.kind(), drafts))
    }
}
