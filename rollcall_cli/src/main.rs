mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollcall_lib::config::{load_config, validate_threshold};
use rollcall_lib::MatchConfig;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Reconcile member identifiers between a roster and speaker statistics")]
struct Cli {
    /// Output format: table, json, csv or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// YAML file with aliases, titles and thresholds (replaces the built-in set)
    #[arg(long, env = "ROLLCALL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Minimum similarity for a fuzzy match (0.0-1.0)
    #[arg(long, global = true)]
    match_threshold: Option<f64>,

    /// Fuzzy matches below this similarity are flagged for review (0.0-1.0)
    #[arg(long, global = true)]
    review_threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match roster entries to statistics entries and report the outcome
    Resolve(commands::resolve::ResolveArgs),
    /// Rewrite roster identifiers using the matched statistics identifiers
    Apply(commands::apply::ApplyArgs),
    /// Show how two names normalize and score against each other
    Score(commands::score::ScoreArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rollcall=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);
    let config = build_config(&cli)?;

    match &cli.command {
        Commands::Resolve(args) => commands::resolve::run(args, config, &format)?,
        Commands::Apply(args) => commands::apply::run(args, config, &format)?,
        Commands::Score(args) => commands::score::run(args, &config, &format)?,
    }

    Ok(())
}

/// Built-in or file config, with command-line threshold overrides applied.
fn build_config(cli: &Cli) -> Result<MatchConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MatchConfig::default(),
    };

    if let Some(threshold) = cli.match_threshold {
        config = config.with_match_threshold(validate_threshold("match_threshold", threshold)?);
    }
    if let Some(threshold) = cli.review_threshold {
        config = config.with_review_threshold(validate_threshold("review_threshold", threshold)?);
    }
    config.validate()?;

    tracing::debug!(
        aliases = config.aliases.len(),
        titles = config.titles.len(),
        match_threshold = config.match_threshold,
        review_threshold = config.review_threshold,
        "Using match config"
    );

    Ok(config)
}
