//! Configuration types for chunking.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{IdScheme, ParamOverrides, StrategyKind, StrategyParams};
use crate::error::{ChunkError, ChunkResult};
use crate::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_MIN_CHUNK_SIZE,
    DEFAULT_TOPIC_MIN_CHUNK_SIZE,
};

/// Engine-wide chunking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Default chunk size in characters
    pub default_chunk_size: usize,

    /// Default overlap in characters
    pub default_overlap: usize,

    /// Strategy used when the caller does not name one
    pub default_strategy: StrategyKind,

    /// How chunk ids are built
    pub id_scheme: IdScheme,

    /// Per-strategy default overrides, keyed by strategy wire name
    pub strategy_defaults: BTreeMap<String, ParamOverrides>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            default_chunk_size: DEFAULT_CHUNK_SIZE,
            default_overlap: DEFAULT_CHUNK_OVERLAP,
            default_strategy: StrategyKind::FixedSize,
            id_scheme: IdScheme::ContentDigest,
            strategy_defaults: BTreeMap::new(),
        }
    }
}

impl ChunkingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_chunk_size: std::env::var("DEFAULT_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_chunk_size),
            default_overlap: std::env::var("DEFAULT_OVERLAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_overlap),
            default_strategy: std::env::var("DEFAULT_STRATEGY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_strategy),
            id_scheme: std::env::var("CHUNK_ID_SCHEME")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.id_scheme),
            strategy_defaults: defaults.strategy_defaults,
        }
    }

    /// Load layered configuration: built-in defaults, then an optional
    /// TOML/JSON file, then `CHUNKER__*` environment variables.
    pub fn load(path: Option<&Path>) -> ChunkResult<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| ChunkError::invalid(format!("config defaults: {}", e)))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(
            config::Environment::with_prefix("CHUNKER")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ChunkError::invalid(format!("config: {}", e)))?;

        loaded.strategy_defaults = canonical_strategy_defaults(loaded.strategy_defaults)?;
        Ok(loaded)
    }

    /// Set the id scheme.
    pub fn with_id_scheme(mut self, scheme: IdScheme) -> Self {
        self.id_scheme = scheme;
        self
    }

    /// Replace the default overrides for one strategy.
    pub fn with_strategy_defaults(mut self, kind: StrategyKind, overrides: ParamOverrides) -> Self {
        self.strategy_defaults.insert(kind.as_str().to_string(), overrides);
        self
    }

    /// Default parameters for `kind`, before any per-call override.
    pub fn defaults_for(&self, kind: StrategyKind) -> ChunkResult<StrategyParams> {
        let mut params = StrategyParams {
            chunk_size: self.default_chunk_size,
            overlap: self.default_overlap,
            max_chunk_size: self.default_chunk_size,
            ..StrategyParams::default()
        };

        params.min_chunk_size = match kind {
            StrategyKind::TopicBased => DEFAULT_TOPIC_MIN_CHUNK_SIZE,
            _ => DEFAULT_MIN_CHUNK_SIZE,
        };

        match self.strategy_defaults.get(kind.as_str()) {
            Some(overrides) => params.merged(overrides),
            None => Ok(params),
        }
    }

    /// Resolve the finalized parameter record for one invocation of `kind`.
    pub fn resolve(
        &self,
        kind: StrategyKind,
        overrides: Option<&ParamOverrides>,
    ) -> ChunkResult<StrategyParams> {
        let defaults = self.defaults_for(kind)?;
        let params = match overrides {
            Some(overrides) => defaults.merged(overrides)?,
            None => defaults,
        };
        params.validate(kind)?;
        Ok(params)
    }
}

/// Re-key `strategy_defaults` by wire name, so `fixed` and `fixed_size`
/// address the same strategy. Two keys naming one strategy are an error.
fn canonical_strategy_defaults(
    defaults: BTreeMap<String, ParamOverrides>,
) -> ChunkResult<BTreeMap<String, ParamOverrides>> {
    let mut canonical = BTreeMap::new();
    for (name, overrides) in defaults {
        let kind: StrategyKind = name.parse()?;
        if canonical.insert(kind.as_str().to_string(), overrides).is_some() {
            return Err(ChunkError::invalid(format!(
                "strategy_defaults names {} more than once (last as `{}`)",
                kind, name
            )));
        }
    }
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_differ_per_strategy() {
        let config = ChunkingConfig::default();
        let sentence = config.defaults_for(StrategyKind::SentenceBoundary).unwrap();
        let topic = config.defaults_for(StrategyKind::TopicBased).unwrap();
        assert_eq!(sentence.min_chunk_size, DEFAULT_MIN_CHUNK_SIZE);
        assert_eq!(topic.min_chunk_size, DEFAULT_TOPIC_MIN_CHUNK_SIZE);
    }

    #[test]
    fn test_resolve_layers_config_then_call() {
        let config = ChunkingConfig::default().with_strategy_defaults(
            StrategyKind::FixedSize,
            ParamOverrides::new().with_chunk_size(400).with_overlap(40),
        );
        let params = config
            .resolve(StrategyKind::FixedSize, Some(&ParamOverrides::new().with_overlap(10)))
            .unwrap();
        assert_eq!(params.chunk_size, 400);
        assert_eq!(params.overlap, 10);

        // Other strategies keep the engine-wide defaults.
        let hybrid = config.resolve(StrategyKind::Hybrid, None).unwrap();
        assert_eq!(hybrid.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_resolve_rejects_non_advancing_window() {
        let config = ChunkingConfig::default();
        let overrides = ParamOverrides::new().with_chunk_size(50).with_overlap(60);
        let result = config.resolve(StrategyKind::FixedSize, Some(&overrides));
        assert!(matches!(result, Err(ChunkError::InvalidParameter(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
default_chunk_size = 400
default_overlap = 50
id_scheme = "content_digest_with_index"

[strategy_defaults.sliding_window]
window_size = 64
stride = 32
"#
        )
        .unwrap();

        let config = ChunkingConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.default_chunk_size, 400);
        assert_eq!(config.default_overlap, 50);
        assert_eq!(config.id_scheme, IdScheme::ContentDigestWithIndex);

        let sliding = config.defaults_for(StrategyKind::SlidingWindow).unwrap();
        assert_eq!(sliding.window_size, 64);
        assert_eq!(sliding.stride, 32);
    }

    #[test]
    fn test_load_applies_strategy_aliases() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
id_scheme = "indexed"

[strategy_defaults.semantic]
max_chunk_size = 77

[strategy_defaults.fixed]
chunk_size = 33
overlap = 3
"#
        )
        .unwrap();

        let config = ChunkingConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.id_scheme, IdScheme::ContentDigestWithIndex);
        assert_eq!(
            config.strategy_defaults.keys().collect::<Vec<_>>(),
            vec!["fixed_size", "semantic_similarity"]
        );

        let semantic = config.defaults_for(StrategyKind::SemanticSimilarity).unwrap();
        assert_eq!(semantic.max_chunk_size, 77);
        let fixed = config.resolve(StrategyKind::FixedSize, None).unwrap();
        assert_eq!(fixed.chunk_size, 33);
        assert_eq!(fixed.overlap, 3);
    }

    #[test]
    fn test_load_rejects_strategy_named_twice() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[strategy_defaults.fixed]
chunk_size = 33

[strategy_defaults.fixed_size]
chunk_size = 44
"#
        )
        .unwrap();

        assert!(matches!(
            ChunkingConfig::load(Some(file.path())),
            Err(ChunkError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_load_rejects_unknown_strategy_key() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[strategy_defaults.chapters]\nchunk_size = 10").unwrap();

        assert!(matches!(
            ChunkingConfig::load(Some(file.path())),
            Err(ChunkError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let config = ChunkingConfig::load(None).unwrap();
        assert_eq!(config.default_strategy, StrategyKind::FixedSize);
    }
}
