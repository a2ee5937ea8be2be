//! Structural chunker for paragraph-delimited text.

use lazy_static::lazy_static;
use regex::Regex;

use super::base::{CharIndex, ChunkDraft, DraftBatch, Strategy};
use crate::error::ChunkResult;
use crate::models::ModelContext;
use crate::types::{OverlapInfo, StrategyKind, StrategyParams};
use crate::HEADER_MAX_CHARS;

lazy_static! {
    /// Blank line, possibly containing whitespace
    static ref PARAGRAPH_BREAK: Regex = Regex::new(r"\n\s*\n").unwrap();
    /// Markdown heading or section number ("2.", "3.1", "4)")
    static ref HEADING_MARKER: Regex = Regex::new(r"^(#{1,6}\s|\d+(\.\d+)*[.)]?\s)").unwrap();
}

/// Splits text on blank lines into paragraphs and flags headers.
///
/// A paragraph is a header when it is a single line under
/// `HEADER_MAX_CHARS` characters that is either fully upper-case or starts
/// with a heading marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralChunker;

impl StructuralChunker {
    pub fn new() -> Self {
        Self
    }

    /// Paragraph drafts, each located in the source.
    ///
    /// The search for each paragraph starts at the end of the previous one,
    /// so duplicated paragraphs resolve to successive occurrences.
    pub(crate) fn drafts(&self, text: &str) -> Vec<ChunkDraft> {
        let index = CharIndex::new(text);
        let mut cursor = 0;

        PARAGRAPH_BREAK
            .split(text)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|paragraph| {
                let (start, end) = index
                    .find_from(paragraph, cursor)
                    .unwrap_or((cursor, cursor));
                cursor = end;

                ChunkDraft::new(paragraph, start, end).with_overlap_info(OverlapInfo::Paragraph {
                    is_header: is_header(paragraph),
                })
            })
            .collect()
    }
}

impl Strategy for StructuralChunker {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Structural
    }

    fn description(&self) -> &'static str {
        "Splits text into blank-line separated paragraphs and detects headers"
    }

    fn segment(
        &self,
        text: &str,
        _params: &StrategyParams,
        _models: &ModelContext,
    ) -> ChunkResult<DraftBatch> {
        Ok(DraftBatch::new(self.kind(), self.drafts(text)))
    }
}

/// Check if a paragraph looks like a header.
pub(crate) fn is_header(paragraph: &str) -> bool {
    if paragraph.contains('\n') || paragraph.chars().count() >= HEADER_MAX_CHARS {
        return false;
    }
    is_upper_case(paragraph) || HEADING_MARKER.is_match(paragraph)
}

/// At least one cased character and no lower-case ones.
fn is_upper_case(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
