//! Error types for the chunking engine.

use thiserror::Error;

/// Errors raised by strategies, the orchestrator and the selector.
///
/// Blank input is deliberately not represented here: every entry point
/// answers whitespace-only text with an empty result instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChunkError {
    /// A parameter is out of range (negative size, overlap >= chunk size, ...)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A strategy name that no registered strategy answers to
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    /// An injected model (tokenizer, segmenter, embedder, clusterer) failed
    #[error("{component} unavailable: {reason}")]
    ModelUnavailable {
        component: &'static str,
        reason: String,
    },
}

impl ChunkError {
    /// Shorthand for an [`ChunkError::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        ChunkError::InvalidParameter(message.into())
    }

    /// Shorthand for a [`ChunkError::ModelUnavailable`].
    pub fn model(component: &'static str, reason: impl std::fmt::Display) -> Self {
        ChunkError::ModelUnavailable {
            component,
            reason: reason.to_string(),
        }
    }
}

/// Result alias used across the crate.
pub type ChunkResult<T> = std::result::Result<T, ChunkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ChunkError::invalid("overlap 10 must be smaller than chunk_size 10");
        assert_eq!(
            err.to_string(),
            "invalid parameter: overlap 10 must be smaller than chunk_size 10"
        );

        let err = ChunkError::model("embedder", "connection refused");
        assert_eq!(err.to_string(), "embedder unavailable: connection refused");
    }
}
