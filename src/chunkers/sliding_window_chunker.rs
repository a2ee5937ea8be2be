//! Sliding-window chunker over tokens.

use super::base::{token_window_draft, CharIndex, DraftBatch, Strategy};
use crate::error::ChunkResult;
use crate::models::ModelContext;
use crate::types::{OverlapInfo, StrategyKind, StrategyParams};

/// Emits windows of `window_size` tokens every `stride` tokens.
///
/// A trailing window shorter than half of `window_size` ends the scan and
/// is dropped. The first window is always kept so that a short document
/// still yields one chunk. Windows that decode to nothing are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlidingWindowChunker;

impl SlidingWindowChunker {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for SlidingWindowChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SlidingWindow
    }

    fn description(&self) -> &'static str {
        "Token windows advancing by a fixed stride"
    }

    fn segment(
        &self,
        text: &str,
        params: &StrategyParams,
        models: &ModelContext,
    ) -> ChunkResult<DraftBatch> {
        params.validate(self.kind())?;
        if text.trim().is_empty() {
            return Ok(DraftBatch::empty(self.kind()));
        }

        let index = CharIndex::new(text);
        let tokens = models.tokenizer.encode(text)?;

        let mut drafts = Vec::new();
        let mut start = 0;

        while start < tokens.len() {
            let end = (start + params.window_size).min(tokens.len());
            if start > 0 && (end - start) * 2 < params.window_size {
                break;
            }

            if let Some(draft) = token_window_draft(&index, models, &tokens, start, end)? {
                drafts.push(draft.with_overlap_info(OverlapInfo::SlidingWindow {
                    window_size: params.window_size,
                    stride: params.stride,
                    window_index: drafts.len(),
                }));
            }

            start += params.stride;
        }

        Ok(DraftBatch::new(self.kind(), drafts))
    }
}
