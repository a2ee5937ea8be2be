//! Core types for the chunking engine.

mod chunk;
mod config;
mod document;
mod results;
mod strategy;

pub use chunk::{chunk_id, content_digest_prefix, Chunk, ChunkMetadata, IdScheme, OverlapInfo};
pub use config::ChunkingConfig;
pub use document::DocumentContext;
pub use results::StrategyResults;
pub use strategy::{ParamOverrides, PerStrategyOverrides, SizeUnit, StrategyKind, StrategyParams};
