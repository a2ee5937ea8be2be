//! Fixed-size chunker over characters or tokens.

use super::base::{token_window_draft, CharIndex, ChunkDraft, DraftBatch, Strategy};
use crate::error::ChunkResult;
use crate::models::ModelContext;
use crate::types::{OverlapInfo, SizeUnit, StrategyKind, StrategyParams};

/// Splits text into windows of `chunk_size` characters or tokens.
///
/// Consecutive windows share `overlap` units, so the window advances by
/// `chunk_size - overlap`. The window that reaches the end of the text is
/// followed by one more starting `overlap` units before the end, a tail
/// already contained in its predecessor; only a window no longer than the
/// overlap ends the scan. Text shorter than `chunk_size` therefore still
/// yields two chunks when `overlap > 0`.
///
/// It doesn't consider semantic boundaries; it's fast and predictable,
/// useful as a fallback or for unstructured content. Token windows that
/// decode to nothing are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSizeChunker;

impl FixedSizeChunker {
    /// Create a new fixed-size chunker.
    pub fn new() -> Self {
        Self
    }

    /// Produce drafts without sealing them, for reuse by composite strategies.
    pub(crate) fn drafts(
        &self,
        text: &str,
        params: &StrategyParams,
        models: &ModelContext,
    ) -> ChunkResult<Vec<ChunkDraft>> {
        params.validate_window()?;
        if text.trim().is_empty() {
            return Ok(vec![]);
        }

        let index = CharIndex::new(text);
        let info = OverlapInfo::FixedWindow {
            chunk_size: params.chunk_size,
            overlap: params.overlap,
            unit: params.unit,
        };

        let drafts = match params.unit {
            SizeUnit::Characters => window_bounds(index.len(), params.chunk_size, params.overlap)
                .into_iter()
                .map(|(start, end)| ChunkDraft::new(index.slice(start, end), start, end))
                .collect(),
            SizeUnit::Tokens => {
                let tokens = models.tokenizer.encode(text)?;
                window_bounds(tokens.len(), params.chunk_size, params.overlap)
                    .into_iter()
                    .filter_map(|(start, end)| {
                        token_window_draft(&index, models, &tokens, start, end).transpose()
                    })
                    .collect::<ChunkResult<Vec<_>>>()?
            }
        };

        Ok(drafts
            .into_iter()
            .map(|draft| draft.with_overlap_info(info.clone()))
            .collect())
    }
}

impl Strategy for FixedSizeChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FixedSize
    }

    fn description(&self) -> &'static str {
        "Splits text into fixed-size character or token windows with overlap"
    }

    fn segment(
        &self,
        text: &str,
        params: &StrategyParams,
        models: &ModelContext,
    ) -> ChunkResult<DraftBatch> {
        Ok(DraftBatch::new(self.kind(), self.drafts(text, params, models)?))
    }
}

/// Window boundaries over `len` units.
///
/// The next window starts `overlap` units before the previous end; once a
/// window is no longer than the overlap, the scan jumps to its end instead,
/// which terminates the loop.
fn window_bounds(len: usize, size: usize, overlap: usize) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + size).min(len);
        bounds.push((start, end));

        let next = end.saturating_sub(overlap);
        start = if next > start { next } else { end };
    }

    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChunkError;
    use crate::test_support::{params_with, test_models};
    use crate::types::ParamOverrides;
    use pretty_assertions::assert_eq;

    fn char_params(size: i64, overlap: i64) -> StrategyParams {
        params_with(ParamOverrides::new().with_chunk_size(size).with_overlap(overlap))
    }

    #[test]
    fn test_empty_content() {
        let models = test_models();
        let chunker = FixedSizeChunker::new();
        let batch = chunker.segment("   \n ", &char_params(10, 2), &models).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_unique_characters_window_arithmetic() {
        let models = test_models();
        let text = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(text.len(), 25);

        let batch = FixedSizeChunker::new()
            .segment(text, &char_params(10, 5), &models)
            .unwrap();
        let spans: Vec<(usize, usize)> = batch.drafts().iter().map(|d| (d.start, d.end)).collect();

        assert_eq!(spans, vec![(0, 10), (5, 15), (10, 20), (15, 25), (20, 25)]);
        for draft in batch.drafts() {
            assert_eq!(draft.text, &text[draft.start..draft.end]);
        }
        // Neighbours share exactly the 5-character overlap.
        for pair in spans.windows(2) {
            assert!(pair[0].1 - pair[1].0 <= 5);
        }
        assert_eq!(batch.drafts().last().unwrap().end, text.len());
    }

    #[test]
    fn test_small_content_keeps_overlap_tail() {
        let models = test_models();
        let batch = FixedSizeChunker::new()
            .segment("Hello, world!", &char_params(100, 10), &models)
            .unwrap();
        let spans: Vec<(usize, usize)> = batch.drafts().iter().map(|d| (d.start, d.end)).collect();

        assert_eq!(spans, vec![(0, 13), (3, 13)]);
        assert_eq!(batch.drafts()[0].text, "Hello, world!");
        assert_eq!(batch.drafts()[1].text, "lo, world!");

        let batch = FixedSizeChunker::new()
            .segment("Hello, world!", &char_params(100, 0), &models)
            .unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_multibyte_offsets_are_characters() {
        let models = test_models();
        let text = "ééééééé";
        let batch = FixedSizeChunker::new()
            .segment(text, &char_params(4, 1), &models)
            .unwrap();
        assert_eq!(batch.drafts()[0].text, "éééé");
        assert_eq!(batch.drafts().last().unwrap().end, 7);
    }

    #[test]
    fn test_overlap_not_smaller_than_size_is_rejected() {
        let models = test_models();
        let params = StrategyParams {
            chunk_size: 5,
            overlap: 5,
            ..StrategyParams::default()
        };
        let result = FixedSizeChunker::new().segment("some text here", &params, &models);
        assert!(matches!(result, Err(ChunkError::InvalidParameter(_))));
    }

    #[test]
    fn test_token_windows() {
        let models = test_models();
        let content = "This is a test sentence. ".repeat(50);
        let params = params_with(
            ParamOverrides::new()
                .with_chunk_size(50)
                .with_overlap(10)
                .with_unit(SizeUnit::Tokens),
        );
        let batch = FixedSizeChunker::new().segment(&content, &params, &models).unwrap();

        assert!(batch.len() > 1);
        let len = content.chars().count();
        for draft in batch.drafts() {
            assert!(draft.start <= draft.end && draft.end <= len);
            assert!(!draft.text.is_empty());
        }
        assert_eq!(batch.drafts().last().unwrap().end, len);
    }

    #[test]
    fn test_partial_character_token_windows_are_skipped() {
        let models = test_models();
        let content = "crab 🦀 crab 🦀🦀 done";
        let params = params_with(
            ParamOverrides::new()
                .with_chunk_size(1)
                .with_overlap(0)
                .with_unit(SizeUnit::Tokens),
        );
        let batch = FixedSizeChunker::new().segment(content, &params, &models).unwrap();

        assert!(!batch.is_empty());
        assert!(batch.len() <= models.tokenizer.count_tokens(content).unwrap());
        for draft in batch.drafts() {
            assert!(!draft.text.is_empty());
        }
    }

    #[test]
    fn test_window_bounds_without_overlap() {
        assert_eq!(window_bounds(7, 3, 0), vec![(0, 3), (3, 6), (6, 7)]);
        assert!(window_bounds(0, 3, 0).is_empty());
        assert_eq!(window_bounds(2, 10, 5), vec![(0, 2)]);
    }
}
