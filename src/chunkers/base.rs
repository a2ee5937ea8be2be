//! Base trait and shared building blocks for all strategies.

use crate::error::ChunkResult;
use crate::models::ModelContext;
use crate::types::{
    chunk_id, Chunk, ChunkMetadata, DocumentContext, IdScheme, OverlapInfo, StrategyKind,
    StrategyParams,
};

/// The core trait that all segmentation strategies implement.
///
/// A strategy is a pure function of the text and its parameters. It
/// produces a [`DraftBatch`]; the caller seals the batch into chunks once
/// every draft exists, which is when `total_chunks` becomes known.
pub trait Strategy: Send + Sync {
    /// The strategy this implementation answers to.
    fn kind(&self) -> StrategyKind;

    /// Segment `text` into drafts.
    ///
    /// # Arguments
    /// * `text` - The full document text
    /// * `params` - Finalized parameters for this invocation
    /// * `models` - Tokenizer, segmenter, embedder and clusterer handles
    fn segment(
        &self,
        text: &str,
        params: &StrategyParams,
        models: &ModelContext,
    ) -> ChunkResult<DraftBatch>;

    /// Get the description of this strategy.
    fn description(&self) -> &'static str {
        "A text segmentation strategy"
    }
}

/// A chunk before its batch is complete.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Known sentence count; computed at seal time when `None`
    pub sentence_count: Option<usize>,
    pub semantic_score: Option<f32>,
    pub topic_cluster: Option<usize>,
    pub overlap_info: Option<OverlapInfo>,
}

impl ChunkDraft {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end: end.max(start),
            sentence_count: None,
            semantic_score: None,
            topic_cluster: None,
            overlap_info: None,
        }
    }

    pub fn with_sentence_count(mut self, count: usize) -> Self {
        self.sentence_count = Some(count);
        self
    }

    pub fn with_semantic_score(mut self, score: f32) -> Self {
        self.semantic_score = Some(score);
        self
    }

    pub fn with_topic_cluster(mut self, label: usize) -> Self {
        self.topic_cluster = Some(label);
        self
    }

    pub fn with_overlap_info(mut self, info: OverlapInfo) -> Self {
        self.overlap_info = Some(info);
        self
    }

    /// Move the draft by `offset` characters, keeping it inside `limit`.
    pub(crate) fn shifted(mut self, offset: usize, limit: usize) -> Self {
        self.start = (self.start + offset).min(limit);
        self.end = (self.end + offset).min(limit).max(self.start);
        self
    }

    /// Length of the draft text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// All drafts of one strategy invocation, in output order.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftBatch {
    strategy: StrategyKind,
    drafts: Vec<ChunkDraft>,
}

impl DraftBatch {
    pub fn new(strategy: StrategyKind, drafts: Vec<ChunkDraft>) -> Self {
        Self { strategy, drafts }
    }

    pub fn empty(strategy: StrategyKind) -> Self {
        Self::new(strategy, Vec::new())
    }

    /// Strategy whose algorithm produced the drafts (a delegate, if any).
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn drafts(&self) -> &[ChunkDraft] {
        &self.drafts
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Turn the drafts into immutable chunks.
    ///
    /// Token and sentence counts are measured over each chunk's own text,
    /// ids are derived per `id_scheme`, and every chunk is stamped with its
    /// index and the final batch size.
    pub fn seal(
        self,
        models: &ModelContext,
        id_scheme: IdScheme,
        context: &DocumentContext,
    ) -> ChunkResult<Vec<Chunk>> {
        let total_chunks = self.drafts.len();
        let strategy = self.strategy;
        let extra = context.extra_value();

        self.drafts
            .into_iter()
            .enumerate()
            .map(|(chunk_index, draft)| -> ChunkResult<Chunk> {
                let token_count = models.tokenizer.count_tokens(&draft.text)?;
                let sentence_count = match draft.sentence_count {
                    Some(count) => count,
                    None => models.segmenter.split(&draft.text)?.len(),
                };

                Ok(Chunk {
                    metadata: ChunkMetadata {
                        id: chunk_id(strategy, &draft.text, chunk_index, id_scheme),
                        strategy,
                        chunk_index,
                        start_position: draft.start,
                        end_position: draft.end,
                        token_count,
                        sentence_count,
                        semantic_score: draft.semantic_score,
                        topic_cluster: draft.topic_cluster,
                        overlap_info: draft.overlap_info,
                        total_chunks,
                        file_id: context.file_id.clone(),
                        project_id: context.project_id.clone(),
                        extra: extra.clone(),
                    },
                    text: draft.text,
                })
            })
            .collect()
    }
}

/// Character-offset view over a string.
///
/// Positions handed out by strategies are character offsets; this maps them
/// to byte offsets for slicing and back.
pub(crate) struct CharIndex<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` as a sentinel
    offsets: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    /// Length in characters.
    pub(crate) fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub(crate) fn byte_offset(&self, char_pos: usize) -> usize {
        self.offsets[char_pos.min(self.len())]
    }

    pub(crate) fn char_offset(&self, byte_pos: usize) -> usize {
        match self.offsets.binary_search(&byte_pos) {
            Ok(i) | Err(i) => i.min(self.len()),
        }
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.byte_offset(start)..self.byte_offset(end.max(start))]
    }

    /// Locate `needle` at or after character offset `from`.
    pub(crate) fn find_from(&self, needle: &str, from: usize) -> Option<(usize, usize)> {
        let from_byte = self.byte_offset(from);
        self.text[from_byte..].find(needle).map(|found| {
            let start = self.char_offset(from_byte + found);
            (start, start + needle.chars().count())
        })
    }
}

/// A sentence and where it sits in the source text.
#[derive(Debug, Clone)]
pub(crate) struct SentenceSpan {
    pub(crate) text: String,
    pub(crate) start: usize,
    pub(crate) end: usize,
    /// False when the segmenter's output could not be found verbatim
    pub(crate) located: bool,
}

/// Segment `index`'s text into sentences and locate each one, scanning
/// forward so repeated sentences map to successive occurrences.
pub(crate) fn sentence_spans(
    index: &CharIndex<'_>,
    models: &ModelContext,
) -> ChunkResult<Vec<SentenceSpan>> {
    let sentences = models.segmenter.split(index.text)?;
    let mut cursor = 0;

    Ok(sentences
        .into_iter()
        .map(|text| match index.find_from(&text, cursor) {
            Some((start, end)) => {
                cursor = end;
                SentenceSpan {
                    text,
                    start,
                    end,
                    located: true,
                }
            }
            None => SentenceSpan {
                text,
                start: cursor,
                end: cursor,
                located: false,
            },
        })
        .collect())
}

/// Build a draft covering a run of sentences.
///
/// When every sentence was located the draft text is the exact source span
/// (inner whitespace preserved); otherwise sentences are joined by a space.
pub(crate) fn group_draft(index: &CharIndex<'_>, group: &[&SentenceSpan]) -> ChunkDraft {
    let start = group.first().map_or(0, |s| s.start);
    let end = group.iter().map(|s| s.end).max().unwrap_or(start);

    let text = if group.iter().all(|s| s.located) {
        index.slice(start, end).to_string()
    } else {
        join_sentences(group)
    };

    ChunkDraft::new(text, start, end).with_sentence_count(group.len())
}

/// Character length `group_draft` would produce for `group`.
pub(crate) fn group_char_len(group: &[&SentenceSpan]) -> usize {
    match (group.first(), group.last()) {
        (Some(first), Some(last)) if group.iter().all(|s| s.located) => last.end - first.start,
        _ => {
            let words: usize = group.iter().map(|s| s.text.chars().count()).sum();
            words + group.len().saturating_sub(1)
        }
    }
}

pub(crate) fn join_sentences(group: &[&SentenceSpan]) -> String {
    group
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode `tokens[start..end]` and estimate its character offsets.
///
/// The start offset is the decoded length of the prefix `tokens[..start]`.
/// Encode/decode need not be length preserving, so the result is clamped
/// into the source and may drift; the last window always ends at the end
/// of the text. Returns `None` when the window decodes to nothing, as a
/// window holding only part of a multi-byte character does.
pub(crate) fn token_window_draft(
    index: &CharIndex<'_>,
    models: &ModelContext,
    tokens: &[usize],
    start: usize,
    end: usize,
) -> ChunkResult<Option<ChunkDraft>> {
    let total = index.len();
    let text = models.tokenizer.decode(&tokens[start..end])?;
    if text.is_empty() {
        return Ok(None);
    }

    let start_char = if start == 0 {
        0
    } else {
        models.tokenizer.decode(&tokens[..start])?.chars().count().min(total)
    };
    let end_char = if end >= tokens.len() {
        total
    } else {
        (start_char + text.chars().count()).min(total)
    };

    Ok(Some(ChunkDraft::new(text, start_char, end_char)))
}
