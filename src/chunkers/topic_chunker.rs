//! Topic-based chunker that clusters sentence embeddings.

use std::collections::BTreeMap;

use tracing::debug;

use super::base::{
    join_sentences, sentence_spans, CharIndex, ChunkDraft, DraftBatch, SentenceSpan, Strategy,
};
use super::SentenceChunker;
use crate::error::{ChunkError, ChunkResult};
use crate::models::{check_batch, ModelContext};
use crate::types::{StrategyKind, StrategyParams};
use crate::DEFAULT_MIN_CHUNK_SIZE;

/// Groups sentences by topic cluster.
///
/// Sentences are embedded and clustered into `min(num_topics, sentences)`
/// groups. Each cluster becomes one chunk holding its sentences in document
/// order; clusters shorter than `min_chunk_size` characters are dropped.
///
/// Chunks come out in cluster-label order, which need not follow the order
/// of the topics in the source text.
///
/// With fewer sentences than `num_topics` the text is grouped by
/// [`SentenceChunker`] instead, using the caller's `max_sentences` and the
/// sentence default for `min_chunk_size`, since the topic value is a drop
/// threshold rather than a group length.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicChunker;

impl TopicChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for TopicChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TopicBased
    }

    fn description(&self) -> &'static str {
        "Clusters sentence embeddings into topics, one chunk per topic"
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

        if sentences.len() < params.num_topics {
            debug!(
                sentences = sentences.len(),
                num_topics = params.num_topics,
                "Fewer sentences than topics, delegating to sentence_boundary"
            );
            let delegate = StrategyParams {
                min_chunk_size: DEFAULT_MIN_CHUNK_SIZE,
                ..params.clone()
            };
            return SentenceChunker::new().segment(text, &delegate, models);
        }

        let texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
        let embeddings = models.embedder.embed(&texts)?;
        check_batch(&embeddings, texts.len())?;

        let k = params.num_topics.min(sentences.len());
        let labels = models.clusterer.cluster(&embeddings, k)?;
        if labels.len() != sentences.len() {
            return Err(ChunkError::model(
                "clusterer",
                format!("returned {} labels for {} vectors", labels.len(), sentences.len()),
            ));
        }

        // Walking sentences in order keeps each cluster in document order.
        let mut clusters: BTreeMap<usize, Vec<&SentenceSpan>> = BTreeMap::new();
        for (sentence, &label) in sentences.iter().zip(&labels) {
            clusters.entry(label).or_default().push(sentence);
        }

        let drafts = clusters
            .into_iter()
            .filter_map(|(label, members)| {
                let text = join_sentences(&members);
                if text.chars().count() < params.min_chunk_size {
                    debug!(label, "Dropping short topic cluster");
                    return None;
                }
                let start = members.first().map_or(0, |s| s.start);
                let end = members.iter().map(|s| s.end).max().unwrap_or(start);
                Some(
                    ChunkDraft::new(text, start, end)
                        .with_sentence_count(members.len())
                        .with_topic_cluster(label),
                )
            })
            .collect();

        Ok(DraftBatch::new(self.kind(), drafts))
    }
}
