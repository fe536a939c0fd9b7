//! The `score` subcommand: show how two names normalize and compare.

use anyhow::Result;
use clap::Args;
use rollcall_lib::similarity::shares_first_token;
use rollcall_lib::{score, MatchConfig, NameNormalizer};
use serde::Serialize;

use crate::output::{build_score_row, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct ScoreArgs {
    /// First name, as written in the roster
    pub name_a: String,

    /// Second name, as written in the statistics
    pub name_b: String,
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    name_a: &'a str,
    name_b: &'a str,
    normalized_a: String,
    normalized_b: String,
    first_token_match: bool,
    similarity: f64,
    would_match: bool,
    needs_review: bool,
}

pub fn run(args: &ScoreArgs, config: &MatchConfig, format: &OutputFormat) -> Result<()> {
    let normalizer = NameNormalizer::from_config(config);
    let a = normalizer.normalize(&args.name_a);
    let b = normalizer.normalize(&args.name_b);
    let similarity = score(&a, &b);

    match format {
        OutputFormat::Json => print_json(&ScoreOutput {
            name_a: &args.name_a,
            name_b: &args.name_b,
            normalized_a: a.to_string(),
            normalized_b: b.to_string(),
            first_token_match: shares_first_token(&a, &b),
            similarity,
            would_match: !a.is_empty() && !b.is_empty() && similarity >= config.match_threshold,
            needs_review: similarity < config.review_threshold,
        }),
        _ => print_rows(
            vec![build_score_row(&args.name_a, &a, &args.name_b, &b, similarity)],
            format,
        )?,
    }

    Ok(())
}
