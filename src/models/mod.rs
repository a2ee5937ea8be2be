//! Injected inference capabilities used by the strategies.
//!
//! The engine never loads or manages models itself. It receives a
//! [`ModelContext`] holding shared, read-only handles and calls through the
//! traits defined here.

mod clusterer;
mod embedder;
mod segmenter;
mod tokenizer;

use std::sync::Arc;

pub use clusterer::{Clusterer, KMeansClusterer};
pub use embedder::{cosine_similarity, mean_pool, normalize, Embedder, HashingEmbedder};
pub(crate) use embedder::check_batch;
pub use segmenter::{DelimiterSegmenter, SentenceSegmenter, UnicodeSentenceSegmenter};
pub use tokenizer::{TiktokenCounter, TokenCounter};

use crate::error::ChunkResult;

/// Shared handles to the tokenizer, segmenter, embedder and clusterer.
///
/// Cloning is cheap; every clone points at the same model instances.
#[derive(Clone)]
pub struct ModelContext {
    pub tokenizer: Arc<dyn TokenCounter>,
    pub segmenter: Arc<dyn SentenceSegmenter>,
    pub embedder: Arc<dyn Embedder>,
    pub clusterer: Arc<dyn Clusterer>,
}

impl ModelContext {
    pub fn new(
        tokenizer: Arc<dyn TokenCounter>,
        segmenter: Arc<dyn SentenceSegmenter>,
        embedder: Arc<dyn Embedder>,
        clusterer: Arc<dyn Clusterer>,
    ) -> Self {
        Self {
            tokenizer,
            segmenter,
            embedder,
            clusterer,
        }
    }

    /// tiktoken cl100k_base, UAX #29 sentences, hashing embedder, k-means.
    pub fn with_defaults() -> ChunkResult<Self> {
        Ok(Self::new(
            Arc::new(TiktokenCounter::new()?),
            Arc::new(UnicodeSentenceSegmenter::new()),
            Arc::new(HashingEmbedder::new()),
            Arc::new(KMeansClusterer::new()),
        ))
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn TokenCounter>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn with_clusterer(mut self, clusterer: Arc<dyn Clusterer>) -> Self {
        self.clusterer = clusterer;
        self
    }
}

impl std::fmt::Debug for ModelContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelContext")
            .field("embedding_dimension", &self.embedder.dimension())
            .finish_non_exhaustive()
    }
}
