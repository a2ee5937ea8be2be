//! Strategy registry and multi-strategy orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::chunkers::{
    FixedSizeChunker, HybridChunker, SemanticChunker, SentenceChunker, SlidingWindowChunker,
    Strategy, StructuralChunker, TopicChunker,
};
use crate::error::{ChunkError, ChunkResult};
use crate::models::ModelContext;
use crate::types::{
    Chunk, ChunkingConfig, DocumentContext, ParamOverrides, PerStrategyOverrides, StrategyKind,
    StrategyParams, StrategyResults,
};

/// Router that owns the registered strategies and runs them.
///
/// Every strategy goes through one call path: parameters are resolved
/// (strategy defaults layered with per-call overrides), the strategy
/// segments the text, and the resulting batch is sealed. In multi-strategy
/// calls a failing strategy is logged and left out of the result; its
/// siblings are unaffected.
pub struct ChunkingRouter {
    strategies: HashMap<StrategyKind, Arc<dyn Strategy>>,
    models: ModelContext,
    config: ChunkingConfig,
}

impl ChunkingRouter {
    /// Create a router with all built-in strategies registered.
    pub fn new(config: ChunkingConfig, models: ModelContext) -> Self {
        let mut router = Self::empty(config, models);
        router.register(Arc::new(FixedSizeChunker::new()));
        router.register(Arc::new(SentenceChunker::new()));
        router.register(Arc::new(SemanticChunker::new()));
        router.register(Arc::new(StructuralChunker::new()));
        router.register(Arc::new(SlidingWindowChunker::new()));
        router.register(Arc::new(TopicChunker::new()));
        router.register(Arc::new(HybridChunker::new()));
        router
    }

    /// Create a router with no strategies registered.
    pub fn empty(config: ChunkingConfig, models: ModelContext) -> Self {
        Self {
            strategies: HashMap::new(),
            models,
            config,
        }
    }

    /// Default configuration and default models.
    pub fn with_defaults() -> ChunkResult<Self> {
        Ok(Self::new(ChunkingConfig::default(), ModelContext::with_defaults()?))
    }

    /// Register a strategy, replacing any previous one of the same kind.
    pub fn register(&mut self, strategy: Arc<dyn Strategy>) {
        self.strategies.insert(strategy.kind(), strategy);
    }

    pub fn unregister(&mut self, kind: StrategyKind) -> Option<Arc<dyn Strategy>> {
        self.strategies.remove(&kind)
    }

    /// Get a strategy by kind.
    pub fn get_strategy(&self, kind: StrategyKind) -> Option<Arc<dyn Strategy>> {
        self.strategies.get(&kind).cloned()
    }

    /// List registered strategies with their descriptions.
    pub fn list_strategies(&self) -> Vec<(StrategyKind, &'static str)> {
        let mut listed: Vec<_> = self
            .strategies
            .values()
            .map(|s| (s.kind(), s.description()))
            .collect();
        listed.sort_by_key(|(kind, _)| *kind);
        listed
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    pub fn models(&self) -> &ModelContext {
        &self.models
    }

    /// Finalized parameters for `kind` under optional per-call overrides.
    pub fn resolve_params(
        &self,
        kind: StrategyKind,
        overrides: Option<&ParamOverrides>,
    ) -> ChunkResult<StrategyParams> {
        self.config.resolve(kind, overrides)
    }

    /// Chunk `text` with a single strategy. Errors propagate to the caller.
    pub fn chunk(
        &self,
        text: &str,
        kind: StrategyKind,
        overrides: &ParamOverrides,
    ) -> ChunkResult<Vec<Chunk>> {
        self.chunk_document(text, kind, overrides, &DocumentContext::default())
    }

    /// [`chunk`](Self::chunk), attaching `context` to every chunk.
    pub fn chunk_document(
        &self,
        text: &str,
        kind: StrategyKind,
        overrides: &ParamOverrides,
        context: &DocumentContext,
    ) -> ChunkResult<Vec<Chunk>> {
        if text.trim().is_empty() {
            return Ok(vec![]);
        }
        self.try_strategy(text, kind, Some(overrides), context)
    }

    /// Run every requested strategy, isolating failures.
    ///
    /// The result holds one entry per strategy that succeeded, in request
    /// order (duplicates collapse onto their first occurrence). Blank text
    /// maps every requested strategy to an empty batch.
    pub fn hybrid_chunk(
        &self,
        text: &str,
        kinds: &[StrategyKind],
        overrides: &PerStrategyOverrides,
    ) -> StrategyResults {
        self.hybrid_chunk_document(text, kinds, overrides, &DocumentContext::default())
    }

    /// [`hybrid_chunk`](Self::hybrid_chunk), attaching `context` to every chunk.
    pub fn hybrid_chunk_document(
        &self,
        text: &str,
        kinds: &[StrategyKind],
        overrides: &PerStrategyOverrides,
        context: &DocumentContext,
    ) -> StrategyResults {
        let kinds = dedup(kinds);
        if text.trim().is_empty() {
            return kinds.into_iter().map(|kind| (kind, Vec::new())).collect();
        }

        let mut results = StrategyResults::new();
        for &kind in &kinds {
            match self.try_strategy(text, kind, overrides.get(&kind), context) {
                Ok(chunks) => results.insert(kind, chunks),
                Err(e) => {
                    warn!(strategy = %kind, error = %e, "Strategy failed, omitting from results");
                }
            }
        }

        info!(
            requested = kinds.len(),
            succeeded = results.len(),
            failed = kinds.len() - results.len(),
            "Multi-strategy chunking complete"
        );
        results
    }

    /// [`hybrid_chunk`](Self::hybrid_chunk) taking strategy names.
    ///
    /// Names that do not parse are logged and skipped.
    pub fn hybrid_chunk_named<S: AsRef<str>>(
        &self,
        text: &str,
        names: &[S],
        overrides: &PerStrategyOverrides,
    ) -> StrategyResults {
        let kinds: Vec<StrategyKind> = names
            .iter()
            .filter_map(|name| match name.as_ref().parse::<StrategyKind>() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    warn!(error = %e, "Skipping unknown strategy");
                    None
                }
            })
            .collect();
        self.hybrid_chunk(text, &kinds, overrides)
    }

    /// Run the requested strategies concurrently on the blocking pool.
    ///
    /// Same contract as [`hybrid_chunk_document`](Self::hybrid_chunk_document):
    /// results are keyed and ordered by request, a failed or panicked
    /// strategy is logged and omitted.
    pub async fn hybrid_chunk_concurrent(
        self: Arc<Self>,
        text: String,
        kinds: Vec<StrategyKind>,
        overrides: PerStrategyOverrides,
        context: DocumentContext,
    ) -> StrategyResults {
        let kinds = dedup(&kinds);
        if text.trim().is_empty() {
            return kinds.into_iter().map(|kind| (kind, Vec::new())).collect();
        }

        let text: Arc<str> = Arc::from(text);
        let context = Arc::new(context);

        let tasks = kinds.iter().map(|&kind| {
            let router = Arc::clone(&self);
            let text = Arc::clone(&text);
            let context = Arc::clone(&context);
            let overrides = overrides.get(&kind).cloned();
            tokio::task::spawn_blocking(move || {
                router.try_strategy(&text, kind, overrides.as_ref(), &context)
            })
        });
        let outcomes = join_all(tasks).await;

        let mut results = StrategyResults::new();
        for (&kind, outcome) in kinds.iter().zip(outcomes) {
            match outcome {
                Ok(Ok(chunks)) => results.insert(kind, chunks),
                Ok(Err(e)) => {
                    warn!(strategy = %kind, error = %e, "Strategy failed, omitting from results");
                }
                Err(e) => {
                    warn!(
                        strategy = %kind,
                        error = %e,
                        "Strategy task aborted, omitting from results"
                    );
                }
            }
        }

        info!(
            requested = kinds.len(),
            succeeded = results.len(),
            "Concurrent multi-strategy chunking complete"
        );
        results
    }

    /// The single call site every strategy invocation goes through.
    fn try_strategy(
        &self,
        text: &str,
        kind: StrategyKind,
        overrides: Option<&ParamOverrides>,
        context: &DocumentContext,
    ) -> ChunkResult<Vec<Chunk>> {
        let strategy = self
            .get_strategy(kind)
            .ok_or_else(|| ChunkError::UnknownStrategy(kind.to_string()))?;
        let params = self.resolve_params(kind, overrides)?;

        debug!(strategy = %kind, embeddings = kind.uses_embeddings(), "Running strategy");
        let batch = strategy.segment(text, &params, &self.models)?;
        if batch.strategy() != kind {
            debug!(strategy = %kind, delegate = %batch.strategy(), "Strategy delegated");
        }

        let chunks = batch.seal(&self.models, self.config.id_scheme, context)?;
        debug!(strategy = %kind, chunks = chunks.len(), "Strategy complete");
        Ok(chunks)
    }
}

fn dedup(kinds: &[StrategyKind]) -> Vec<StrategyKind> {
    let mut unique = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_models, FailingEmbedder};
    use crate::types::{IdScheme, OverlapInfo};
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = "CHUNKING OVERVIEW\n\n\
        Chunking splits long documents into pieces. Each piece is embedded separately. \
        Retrieval then works over the pieces.\n\n\
        # Strategies\n\n\
        Fixed windows are simple and predictable. Sentence groups keep thoughts whole. \
        Topic clusters gather related sentences. Hybrid chunking combines structure with size.";

    fn router() -> ChunkingRouter {
        ChunkingRouter::new(ChunkingConfig::default(), test_models())
    }

    #[test]
    fn test_fixed_size_single_strategy() {
        let router = router();
        let text = "abcdefghijklmnopqrstuvwxy";
        let overrides = ParamOverrides::new().with_chunk_size(10).with_overlap(5);
        let chunks = router.chunk(text, StrategyKind::FixedSize, &overrides).unwrap();

        assert_eq!(chunks.len(), 5);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.total_chunks, 5);
            assert_eq!(chunk.metadata.chunk_index, i);
            assert_eq!(chunk.metadata.start_position, i * 5);
            assert_eq!(chunk.metadata.strategy, StrategyKind::FixedSize);
            assert!(chunk.metadata.id.starts_with("fixed_size_"));
        }
        assert_eq!(chunks.last().unwrap().metadata.end_position, 25);
    }

    #[test]
    fn test_blank_text_yields_empty_results() {
        let router = router();
        let chunks = router
            .chunk("  \n\t ", StrategyKind::SemanticSimilarity, &ParamOverrides::new())
            .unwrap();
        assert!(chunks.is_empty());

        let kinds = [StrategyKind::FixedSize, StrategyKind::TopicBased];
        let results = router.hybrid_chunk("   ", &kinds, &PerStrategyOverrides::new());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, chunks)| chunks.is_empty()));
    }

    #[test]
    fn test_failing_strategy_is_isolated() {
        let models = test_models().with_embedder(Arc::new(FailingEmbedder));
        let router = ChunkingRouter::new(ChunkingConfig::default(), models);
        let kinds = [
            StrategyKind::FixedSize,
            StrategyKind::SemanticSimilarity,
            StrategyKind::Structural,
        ];

        let results = router.hybrid_chunk(DOCUMENT, &kinds, &PerStrategyOverrides::new());

        assert!(!results.contains(StrategyKind::SemanticSimilarity));
        assert!(!results.get(StrategyKind::FixedSize).unwrap().is_empty());
        assert!(!results.get(StrategyKind::Structural).unwrap().is_empty());
        let order: Vec<_> = results.strategies().collect();
        assert_eq!(order, vec![StrategyKind::FixedSize, StrategyKind::Structural]);
    }

    #[test]
    fn test_single_strategy_failure_propagates() {
        let models = test_models().with_embedder(Arc::new(FailingEmbedder));
        let router = ChunkingRouter::new(ChunkingConfig::default(), models);
        let result = router.chunk(
            DOCUMENT,
            StrategyKind::SemanticSimilarity,
            &ParamOverrides::new(),
        );
        assert!(matches!(result, Err(ChunkError::ModelUnavailable { .. })));
    }

    #[test]
    fn test_invalid_parameters() {
        let router = router();
        let overrides = ParamOverrides::new().with_chunk_size(10).with_overlap(10);
        assert!(matches!(
            router.chunk(DOCUMENT, StrategyKind::FixedSize, &overrides),
            Err(ChunkError::InvalidParameter(_))
        ));

        let mut per_strategy = PerStrategyOverrides::new();
        per_strategy.insert(StrategyKind::FixedSize, overrides);
        let results = router.hybrid_chunk(
            DOCUMENT,
            &[StrategyKind::FixedSize, StrategyKind::Hybrid],
            &per_strategy,
        );
        // Overrides apply only to the strategy they are keyed by.
        assert!(!results.contains(StrategyKind::FixedSize));
        assert!(results.contains(StrategyKind::Hybrid));
    }

    #[test]
    fn test_unknown_names_are_skipped() {
        let router = router();
        let results = router.hybrid_chunk_named(
            DOCUMENT,
            &["structural", "does_not_exist", "sentence"],
            &PerStrategyOverrides::new(),
        );
        let order: Vec<_> = results.strategies().collect();
        assert_eq!(order, vec![StrategyKind::Structural, StrategyKind::SentenceBoundary]);
    }

    #[test]
    fn test_unregistered_strategy() {
        let mut router = router();
        router.unregister(StrategyKind::TopicBased);

        assert!(matches!(
            router.chunk(DOCUMENT, StrategyKind::TopicBased, &ParamOverrides::new()),
            Err(ChunkError::UnknownStrategy(_))
        ));
        let results = router.hybrid_chunk(
            DOCUMENT,
            &[StrategyKind::TopicBased, StrategyKind::Structural],
            &PerStrategyOverrides::new(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(router.list_strategies().len(), 6);
    }

    #[test]
    fn test_every_batch_is_consistent() {
        let router = router();
        let mut overrides = PerStrategyOverrides::new();
        overrides.insert(
            StrategyKind::FixedSize,
            ParamOverrides::new().with_chunk_size(80).with_overlap(20),
        );
        overrides.insert(StrategyKind::SlidingWindow, ParamOverrides::new().with_window(16, 8));
        overrides.insert(
            StrategyKind::TopicBased,
            ParamOverrides::new().with_num_topics(3).with_min_chunk_size(1),
        );
        overrides.insert(
            StrategyKind::Hybrid,
            ParamOverrides::new().with_chunk_size(60).with_overlap(10),
        );

        let results = router.hybrid_chunk(DOCUMENT, &StrategyKind::ALL, &overrides);
        assert_eq!(results.len(), StrategyKind::ALL.len());

        let len = DOCUMENT.chars().count();
        for (kind, chunks) in results.iter() {
            assert!(!chunks.is_empty(), "{} produced nothing", kind);
            for chunk in chunks {
                assert_eq!(chunk.metadata.total_chunks, chunks.len());
                assert!(chunk.metadata.start_position <= chunk.metadata.end_position);
                assert!(chunk.metadata.end_position <= len);
            }
        }

        let structural = results.get(StrategyKind::Structural).unwrap();
        assert_eq!(
            structural[0].metadata.overlap_info,
            Some(OverlapInfo::Paragraph { is_header: true })
        );
        assert!(results
            .get(StrategyKind::TopicBased)
            .unwrap()
            .iter()
            .all(|c| c.metadata.topic_cluster.is_some()));
    }

    #[test]
    fn test_context_and_id_scheme() {
        let config = ChunkingConfig::default().with_id_scheme(IdScheme::ContentDigestWithIndex);
        let router = ChunkingRouter::new(config, test_models());
        let context = DocumentContext::new("file-7", "project-3")
            .with_extra("file_name", serde_json::json!("guide.md"));

        let overrides = ParamOverrides::new().with_chunk_size(4).with_overlap(0);
        let chunks = router
            .chunk_document("abcdabcd", StrategyKind::FixedSize, &overrides, &context)
            .unwrap();

        assert_eq!(chunks.len(), 2);
        assert_ne!(chunks[0].metadata.id, chunks[1].metadata.id);
        assert!(chunks[1].metadata.id.ends_with("_1"));
        assert_eq!(chunks[0].metadata.project_id.as_deref(), Some("project-3"));
        assert_eq!(
            chunks[0].metadata.extra,
            Some(serde_json::json!({"file_name": "guide.md"}))
        );
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let router = Arc::new(router());
        let kinds = vec![
            StrategyKind::Structural,
            StrategyKind::FixedSize,
            StrategyKind::SentenceBoundary,
        ];

        let sequential = router.hybrid_chunk(DOCUMENT, &kinds, &PerStrategyOverrides::new());
        let concurrent = Arc::clone(&router)
            .hybrid_chunk_concurrent(
                DOCUMENT.to_string(),
                kinds,
                PerStrategyOverrides::new(),
                DocumentContext::default(),
            )
            .await;

        assert_eq!(concurrent, sequential);
    }

    #[test]
    fn test_concurrent_isolates_failures() {
        let models = test_models().with_embedder(Arc::new(FailingEmbedder));
        let router = Arc::new(ChunkingRouter::new(ChunkingConfig::default(), models));
        let results = tokio_test::block_on(router.hybrid_chunk_concurrent(
            DOCUMENT.to_string(),
            vec![StrategyKind::TopicBased, StrategyKind::Hybrid],
            PerStrategyOverrides::new(),
            DocumentContext::default(),
        ));

        let order: Vec<_> = results.strategies().collect();
        assert_eq!(order, vec![StrategyKind::Hybrid]);
    }
}
