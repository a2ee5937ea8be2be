//! End-to-end tests through the public API.

use std::io::Write;
use std::sync::Arc;

use hybrid_chunker::models::{Embedder, HashingEmbedder};
use hybrid_chunker::prelude::*;
use pretty_assertions::assert_eq;

const GUIDE: &str = "GETTING STARTED\n\n\
    Install the toolchain first. Then create a new project. \
    Build it once to fetch dependencies.\n\n\
    1. Configuration\n\n\
    Settings live in a single file. Environment variables override the file. \
    Unknown keys are rejected at load time.\n\n\
    2. Running\n\n\
    Start the binary with the input file as its only argument. \
    Output is printed as JSON on standard output.";

/// Embedder that counts calls before delegating.
struct CountingEmbedder {
    inner: HashingEmbedder,
    calls: std::sync::atomic::AtomicUsize,
}

impl Embedder for CountingEmbedder {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn embed(&self, sentences: &[String]) -> ChunkResult<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.inner.embed(sentences)
    }
}

#[test]
fn test_multi_strategy_pipeline() {
    let router = ChunkingRouter::with_defaults().unwrap();
    let mut overrides = PerStrategyOverrides::new();
    overrides.insert(
        StrategyKind::FixedSize,
        ParamOverrides::new().with_chunk_size(120).with_overlap(20),
    );
    overrides.insert(
        StrategyKind::SentenceBoundary,
        ParamOverrides::new().with_max_sentences(2).with_min_chunk_size(10_000),
    );

    let kinds = [
        StrategyKind::FixedSize,
        StrategyKind::SentenceBoundary,
        StrategyKind::Structural,
    ];
    let results = router.hybrid_chunk(GUIDE, &kinds, &overrides);
    assert_eq!(results.strategies().collect::<Vec<_>>(), kinds.to_vec());

    let length = GUIDE.chars().count();
    for (_, chunks) in results.iter() {
        assert!(chunks.last().unwrap().metadata.end_position <= length);
        for chunk in chunks {
            assert_eq!(chunk.metadata.total_chunks, chunks.len());
        }
    }

    // Sentence groups of two, nothing lost, nothing repeated.
    let sentences = router.models().segmenter.split(GUIDE).unwrap();
    let regrouped: usize = results
        .get(StrategyKind::SentenceBoundary)
        .unwrap()
        .iter()
        .map(|c| c.metadata.sentence_count)
        .sum();
    assert_eq!(regrouped, sentences.len());

    let headers: Vec<&str> = results
        .get(StrategyKind::Structural)
        .unwrap()
        .iter()
        .filter(|c| c.metadata.overlap_info.as_ref().map_or(false, OverlapInfo::is_header))
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(headers, vec!["GETTING STARTED", "1. Configuration", "2. Running"]);

    let selected = select_best(&results, Criterion::Structural).unwrap();
    assert_eq!(selected, results.get(StrategyKind::Structural).unwrap().to_vec());

    let stats = chunk_stats(&selected);
    assert_eq!(stats.total_chunks, selected.len());
    assert!(stats.min_chunk_size <= stats.max_chunk_size);
}

#[test]
fn test_models_are_injected() {
    let embedder = Arc::new(CountingEmbedder {
        inner: HashingEmbedder::new(),
        calls: Default::default(),
    });
    let models = ModelContext::with_defaults()
        .unwrap()
        .with_embedder(embedder.clone());
    let router = ChunkingRouter::new(ChunkingConfig::default(), models);

    let chunks = router
        .chunk(GUIDE, StrategyKind::SemanticSimilarity, &ParamOverrides::new())
        .unwrap();

    assert!(!chunks.is_empty());
    assert_eq!(embedder.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert!(chunks.iter().all(|c| c.metadata.semantic_score.is_some()));
}

#[test]
fn test_document_context_reaches_embedding_payload() {
    let router = ChunkingRouter::with_defaults().unwrap();
    let context = DocumentContext::from_metadata(
        serde_json::json!({
            "file_id": "f-42",
            "project_id": "p-7",
            "file_name": "guide.txt",
        })
        .as_object()
        .cloned()
        .unwrap(),
    );

    let chunks = router
        .chunk_document(GUIDE, StrategyKind::Hybrid, &ParamOverrides::new(), &context)
        .unwrap();
    let payload = prepare_for_embedding(&chunks);

    assert_eq!(payload.len(), chunks.len());
    for (meta, chunk) in payload.metadatas.iter().zip(&chunks) {
        assert_eq!(meta["file_id"], "f-42");
        assert_eq!(meta["project_id"], "p-7");
        assert_eq!(meta["file_name"], "guide.txt");
        assert_eq!(meta["chunk_id"], chunk.metadata.id.as_str());
    }
}

#[test]
fn test_results_serialize_by_strategy_name() {
    let router = ChunkingRouter::with_defaults().unwrap();
    let results = router.hybrid_chunk_named(
        "Short text. Two sentences.",
        &["fixed", "paragraph"],
        &PerStrategyOverrides::new(),
    );

    let value = serde_json::to_value(&results).unwrap();
    let object = value.as_object().unwrap();
    assert!(object.contains_key("fixed_size"));
    assert!(object.contains_key("structural"));
    assert_eq!(value["fixed_size"][0]["metadata"]["strategy"], "fixed_size");
}

#[test]
fn test_config_file_drives_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "default_chunk_size = 40\ndefault_overlap = 10").unwrap();
    let config = ChunkingConfig::load(Some(file.path())).unwrap();

    let router = ChunkingRouter::new(config, ModelContext::with_defaults().unwrap());
    let chunks = router
        .chunk(GUIDE, StrategyKind::FixedSize, &ParamOverrides::new())
        .unwrap();

    assert!(chunks.iter().all(|c| c.len() <= 40));
    assert_eq!(chunks[1].metadata.start_position, 30);
}
