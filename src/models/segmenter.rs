//! Sentence segmentation.

use unicode_segmentation::UnicodeSegmentation;

use crate::error::ChunkResult;

/// Splits text into an ordered sequence of trimmed, non-empty sentences.
pub trait SentenceSegmenter: Send + Sync {
    fn split(&self, text: &str) -> ChunkResult<Vec<String>>;
}

/// Sentence boundaries per Unicode UAX #29.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSegmenter;

impl UnicodeSentenceSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn split(&self, text: &str) -> ChunkResult<Vec<String>> {
        Ok(text
            .unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect())
    }
}

/// Splits after a delimiter that is followed by whitespace or end of input.
#[derive(Debug, Clone)]
pub struct DelimiterSegmenter {
    /// Sentence-ending delimiters
    delimiters: Vec<char>,
}

impl DelimiterSegmenter {
    /// Create a segmenter with default delimiters.
    pub fn new() -> Self {
        Self {
            delimiters: vec!['.', '!', '?'],
        }
    }

    /// Create a segmenter with custom delimiters.
    pub fn with_delimiters(delimiters: Vec<char>) -> Self {
        Self { delimiters }
    }
}

impl Default for DelimiterSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSegmenter for DelimiterSegmenter {
    fn split(&self, text: &str) -> ChunkResult<Vec<String>> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            current.push(c);

            // Look ahead for space or end of string
            if self.delimiters.contains(&c)
                && chars.peek().map_or(true, |next| next.is_whitespace())
            {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }

        let trimmed = current.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }

        Ok(sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unicode_sentences() {
        let segmenter = UnicodeSentenceSegmenter::new();
        let sentences = segmenter
            .split("This is the first sentence. This is the second! Is this the third?")
            .unwrap();
        assert_eq!(
            sentences,
            vec![
                "This is the first sentence.",
                "This is the second!",
                "Is this the third?"
            ]
        );
    }

    #[test]
    fn test_unicode_blank_input() {
        let segmenter = UnicodeSentenceSegmenter::new();
        assert!(segmenter.split("   \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_delimiter_segmenter() {
        let segmenter = DelimiterSegmenter::new();
        let sentences = segmenter.split("Version 1.5 shipped. Did it work? Yes").unwrap();
        assert_eq!(sentences, vec!["Version 1.5 shipped.", "Did it work?", "Yes"]);
    }

    #[test]
    fn test_custom_delimiters() {
        let segmenter = DelimiterSegmenter::with_delimiters(vec![';']);
        let sentences = segmenter.split("one; two; three").unwrap();
        assert_eq!(sentences, vec!["one;", "two;", "three"]);
    }
}
