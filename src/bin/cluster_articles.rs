use anyhow::{Context, Result};
use clap::Parser;
use minerva::config::{EngineConfig, ProviderConfig, ProviderKind};
use minerva::enrichment::build_provider;
use minerva::logging::configure_logging;
use minerva::{Article, TopicEngine, TARGET_ENGINE};
use std::fs;
use std::path::PathBuf;
use tokio::time::Instant;
use tracing::info;

/// Groups a snapshot of articles into corroborated topics.
///
/// Usage:
///    cargo run --bin cluster_articles -- --input articles.json --output topics.json
///
/// The input is a JSON array of articles; the output is a JSON array of topics,
/// written to stdout when no output file is given. Provider and engine settings
/// come from the environment (AI_PROVIDER, OLLAMA_HOST, AI_MODEL, GROQ_API_KEY, ...) and can be
/// overridden with the flags below.
#[derive(Parser)]
#[clap(name = "cluster_articles", about = "Synthesize topics from a batch of articles")]
struct Cli {
    /// JSON file with the articles to cluster
    #[clap(short, long)]
    input: PathBuf,

    /// Where to write the topics (stdout when omitted)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Enrichment backend, overriding AI_PROVIDER
    #[clap(short, long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name, overriding AI_MODEL
    #[clap(short, long)]
    model: Option<String>,

    /// Keep short and promotional articles
    #[clap(long)]
    no_noise_filter: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let start_time = Instant::now();

    let raw = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let articles: Vec<Article> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse articles from {}", cli.input.display()))?;
    info!(target: TARGET_ENGINE, "Loaded {} articles from {}", articles.len(), cli.input.display());

    let mut provider_config = ProviderConfig::from_env()?;
    if let Some(kind) = cli.provider {
        provider_config.kind = kind;
    }
    if let Some(model) = cli.model {
        provider_config.model = Some(model);
    }
    let provider = build_provider(&provider_config)?;

    let mut engine_config = EngineConfig::from_env();
    if cli.no_noise_filter {
        engine_config.noise_filter = false;
    }

    let engine = TopicEngine::new(provider, engine_config);
    let output = engine.run(articles).await;

    let json = serde_json::to_string_pretty(&output.topics).context("Failed to serialize topics")?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(target: TARGET_ENGINE, "Wrote {} topics to {}", output.topics.len(), path.display());
        }
        None => println!("{}", json),
    }

    let stats = &output.stats;
    info!(target: TARGET_ENGINE, "Received: {}", stats.received);
    info!(target: TARGET_ENGINE, "Discarded as noise: {}", stats.discarded_noise);
    info!(target: TARGET_ENGINE, "Discarded with too few tags: {}", stats.discarded_few_tags);
    info!(target: TARGET_ENGINE, "Enrichment fallbacks: {}", stats.enrichment_fallbacks);
    info!(target: TARGET_ENGINE, "Clusters formed: {}", stats.clusters_formed);
    info!(target: TARGET_ENGINE, "Articles in uncorroborated clusters: {}", stats.rejected_low_corroboration);
    info!(target: TARGET_ENGINE, "Topics emitted: {}", stats.topics_emitted);
    info!(target: TARGET_ENGINE, "Clustering completed in {:?}", start_time.elapsed());

    Ok(())
}
