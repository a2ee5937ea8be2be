//! Semantic-similarity chunker.
//!
//! Sentences are embedded once, then grown greedily into chunks: the next
//! sentence joins the running chunk while its cosine similarity to the
//! chunk's centroid stays at or above `similarity_threshold` and the chunk
//! stays within `max_chunk_size` characters.

use tracing::debug;

use super::base::{
    group_char_len, group_draft, sentence_spans, CharIndex, ChunkDraft, DraftBatch, SentenceSpan,
    Strategy,
};
use super::FixedSizeChunker;
use crate::error::ChunkResult;
use crate::models::{check_batch, cosine_similarity, mean_pool, ModelContext};
use crate::types::{StrategyKind, StrategyParams};

/// Greedy embedding-similarity chunker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticChunker;

impl SemanticChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SemanticChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SemanticSimilarity
    }

    fn description(&self) -> &'static str {
        "Grows chunks while sentences stay similar to the running centroid"
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

        // Nothing to compare against; fall back to fixed-size windows
        if sentences.len() <= 1 {
            debug!(sentences = sentences.len(), "Too few sentences, delegating to fixed_size");
            return FixedSizeChunker::new().segment(text, params, models);
        }

        let texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
        let embeddings = models.embedder.embed(&texts)?;
        check_batch(&embeddings, texts.len())?;

        let mut drafts = Vec::new();
        let mut current: Vec<usize> = vec![0];

        for next in 1..sentences.len() {
            let centroid = mean_pool(current.iter().map(|&i| &embeddings[i]));
            let similarity = cosine_similarity(&embeddings[next], &centroid);

            let mut candidate: Vec<&SentenceSpan> =
                current.iter().map(|&i| &sentences[i]).collect();
            candidate.push(&sentences[next]);
            let fits = group_char_len(&candidate) <= params.max_chunk_size;

            if similarity >= params.similarity_threshold && fits {
                current.push(next);
            } else {
                drafts.push(finalize(&index, &sentences, &embeddings, &current));
                current = vec![next];
            }
        }
        drafts.push(finalize(&index, &sentences, &embeddings, &current));

        Ok(DraftBatch::new(self.kind(), drafts))
    }
}

/// Build the draft for a finished run and score its cohesion.
///
/// The score is the mean similarity of every later sentence to the first
/// one (1.0 for a single sentence); it describes this chunk only.
fn finalize(
    index: &CharIndex<'_>,
    sentences: &[SentenceSpan],
    embeddings: &[Vec<f32>],
    members: &[usize],
) -> ChunkDraft {
    let group: Vec<&SentenceSpan> = members.iter().map(|&i| &sentences[i]).collect();

    let score = match members.split_first() {
        Some((&first, rest)) if !rest.is_empty() => {
            let total: f32 = rest
                .iter()
                .map(|&i| cosine_similarity(&embeddings[i], &embeddings[first]))
                .sum();
            total / rest.len() as f32
        }
        _ => 1.0,
    };

    group_draft(index, &group).with_semantic_score(score)
}
