//! Segmentation strategies.

mod base;
mod fixed_size_chunker;
mod hybrid_chunker;
mod semantic_chunker;
mod sentence_chunker;
mod sliding_window_chunker;
mod structural_chunker;
mod topic_chunker;

pub use base::{ChunkDraft, DraftBatch, Strategy};
pub use fixed_size_chunker::FixedSizeChunker;
pub use hybrid_chunker::HybridChunker;
pub use semantic_chunker::SemanticChunker;
pub use sentence_chunker::SentenceChunker;
pub use sliding_window_chunker::SlidingWindowChunker;
pub use structural_chunker::StructuralChunker;
pub use topic_chunker::TopicChunker;
