//! Tokenizer adapter.

use crate::error::{ChunkError, ChunkResult};

/// Token counter trait for encoding text to tokens and back.
///
/// Implementations must be safe to call from several chunking requests at
/// once.
pub trait TokenCounter: Send + Sync {
    /// Encode text into token IDs.
    fn encode(&self, text: &str) -> ChunkResult<Vec<usize>>;

    /// Decode token IDs back to text.
    ///
    /// Encode followed by decode is not guaranteed to reproduce the input
    /// byte for byte, so callers deriving offsets from decoded text must
    /// treat them as estimates.
    fn decode(&self, tokens: &[usize]) -> ChunkResult<String>;

    /// Count the number of tokens in the given text.
    fn count_tokens(&self, text: &str) -> ChunkResult<usize> {
        Ok(self.encode(text)?.len())
    }
}

/// Default token counter using tiktoken (cl100k_base encoding).
pub struct TiktokenCounter {
    bpe: tiktoken_rs::CoreBPE,
}

impl TiktokenCounter {
    /// Create a new token counter with the cl100k_base encoding (GPT-4/ChatGPT).
    pub fn new() -> ChunkResult<Self> {
        Self::with_encoding("cl100k_base")
    }

    /// Create a token counter with a specific encoding.
    pub fn with_encoding(encoding_name: &str) -> ChunkResult<Self> {
        let bpe = match encoding_name {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => {
                return Err(ChunkError::invalid(format!("unknown tiktoken encoding: {}", other)))
            }
        }
        .map_err(|e| ChunkError::model("tokenizer", e))?;
        Ok(Self { bpe })
    }

    /// Decode, shaving up to three tokens off either edge when the window
    /// cuts a multi-byte character in half.
    fn decode_tolerant(&self, tokens: &[usize]) -> ChunkResult<String> {
        let mut last_error = None;
        for front in 0..=3usize.min(tokens.len()) {
            for back in 0..=3usize.min(tokens.len() - front) {
                match self.bpe.decode(tokens[front..tokens.len() - back].to_vec()) {
                    Ok(text) => return Ok(text),
                    Err(e) => last_error = Some(e),
                }
            }
        }
        Err(ChunkError::model(
            "tokenizer",
            last_error.map(|e| e.to_string()).unwrap_or_default(),
        ))
    }
}

impl TokenCounter for TiktokenCounter {
    fn encode(&self, text: &str) -> ChunkResult<Vec<usize>> {
        Ok(self.bpe.encode_ordinary(text))
    }

    fn decode(&self, tokens: &[usize]) -> ChunkResult<String> {
        if tokens.is_empty() {
            return Ok(String::new());
        }
        self.decode_tolerant(tokens)
    }
}
