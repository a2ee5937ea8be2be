//! Hybrid Chunker - Command Line Entry Point
//!
//! Chunks a text file (or stdin) with one or more strategies and prints the
//! results as JSON.
//!
//! ```text
//! hybrid-chunker [FILE] [--strategies a,b,c] [--select CRITERION] [--config PATH]
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hybrid_chunker::types::PerStrategyOverrides;
use hybrid_chunker::{
    chunk_stats, select_best, ChunkingConfig, ChunkingRouter, Criterion, ModelContext,
    StrategyKind,
};

/// Chunk a document with one or more strategies and print JSON.
#[derive(Debug, Parser)]
#[command(name = "hybrid-chunker", version)]
struct Cli {
    /// Input file; reads stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Strategies to run, comma separated (defaults to the configured strategy)
    #[arg(short, long, value_delimiter = ',')]
    strategies: Vec<String>,

    /// Reduce the results to one chunk list (balanced, semantic, structural, size)
    #[arg(long)]
    select: Option<String>,

    /// TOML or JSON configuration file, layered under `CHUNKER__*` variables
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Input path, with `-` meaning stdin.
    fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }

    fn strategy_names(&self, config: &ChunkingConfig) -> Vec<String> {
        let names: Vec<String> = self
            .strategies
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            vec![config.default_strategy.as_str().to_string()]
        } else {
            names
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "hybrid_chunker=info".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays valid JSON.
    if std::env::var("LOG_FORMAT").map_or(false, |f| f.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Cli::parse();

    let config = match &args.config {
        Some(path) => ChunkingConfig::load(Some(path.as_path()))
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ChunkingConfig::from_env(),
    };

    info!("Starting Hybrid Chunker v{}", env!("CARGO_PKG_VERSION"));
    info!("Default chunk size: {} characters", config.default_chunk_size);

    let names = args.strategy_names(&config);

    let models = ModelContext::with_defaults().context("failed to initialize models")?;
    let router = ChunkingRouter::new(config, models);

    let text = read_input(args.input_path())?;
    info!(chars = text.chars().count(), strategies = ?names, "Chunking input");

    let results = router.hybrid_chunk_named(&text, &names, &PerStrategyOverrides::new());

    let stats: BTreeMap<StrategyKind, _> = results
        .iter()
        .map(|(kind, chunks)| (kind, chunk_stats(chunks)))
        .collect();

    let mut output = json!({
        "results": results,
        "stats": stats,
    });

    if let Some(name) = &args.select {
        let criterion = Criterion::parse_lenient(name);
        let selected = select_best(&results, criterion)?;
        output["selected"] = json!({
            "criterion": criterion,
            "stats": chunk_stats(&selected),
            "chunks": selected,
        });
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
