//! Hybrid chunker: structure first, size second.

use super::base::{ChunkDraft, DraftBatch, Strategy};
use super::{FixedSizeChunker, StructuralChunker};
use crate::error::ChunkResult;
use crate::models::ModelContext;
use crate::types::{OverlapInfo, SizeUnit, StrategyKind, StrategyParams};
use crate::HYBRID_RESPLIT_FACTOR;

/// Splits text into paragraphs, then re-splits any paragraph longer than
/// `chunk_size * 1.5` with fixed-size windows of the same `chunk_size` and
/// `overlap`. Paragraph length is measured in `unit`, so with token units the
/// threshold counts tokens.
///
/// Re-split pieces are shifted back into the coordinates of the whole
/// document, so offsets always refer to the original text.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridChunker {
    structural: StructuralChunker,
    fixed: FixedSizeChunker,
}

impl HybridChunker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for HybridChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Hybrid
    }

    fn description(&self) -> &'static str {
        "Paragraph segmentation with oversized paragraphs re-split by size"
    }

    fn segment(
        &self,
        text: &str,
        params: &StrategyParams,
        models: &ModelContext,
    ) -> ChunkResult<DraftBatch> {
        params.validate_window()?;

        let threshold = params.chunk_size as f64 * HYBRID_RESPLIT_FACTOR;
        let mut drafts = Vec::new();

        for (segment_index, segment) in self.structural.drafts(text).into_iter().enumerate() {
            let is_header = segment
                .overlap_info
                .as_ref()
                .map_or(false, OverlapInfo::is_header);

            let length = match params.unit {
                SizeUnit::Characters => segment.char_len(),
                SizeUnit::Tokens => models.tokenizer.count_tokens(&segment.text)?,
            };

            if length as f64 > threshold {
                let (offset, limit) = (segment.start, segment.end);
                for piece in self.fixed.drafts(&segment.text, params, models)? {
                    drafts.push(tag(piece.shifted(offset, limit), segment_index, true, is_header));
                }
            } else {
                drafts.push(tag(segment, segment_index, false, is_header));
            }
        }

        Ok(DraftBatch::new(self.kind(), drafts))
    }
}

fn tag(draft: ChunkDraft, segment_index: usize, resplit: bool, is_header: bool) -> ChunkDraft {
    draft.with_overlap_info(OverlapInfo::Hybrid {
        segment_index,
        resplit,
        is_header,
    })
}
