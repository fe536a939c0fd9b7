//! The `resolve` subcommand: match a roster against speaker statistics and
//! report what needs a human look.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rollcall_lib::store::{load_roster, load_stats, roster_entries, save_json_pretty};
use rollcall_lib::{MatchConfig, MatchResolver, ResolutionReport};

use crate::output::{build_outcome_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct ResolveArgs {
    /// Roster JSON file (array of records with `name` and `person_id`)
    #[arg(long)]
    pub roster: PathBuf,

    /// Speaker statistics JSON file (object keyed by name, or array of records)
    #[arg(long)]
    pub stats: PathBuf,

    /// Also write the full JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// List every assignment, not only review items and unmatched entries
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: &ResolveArgs, config: MatchConfig, format: &OutputFormat) -> Result<()> {
    let records = load_roster(&args.roster)?;
    let roster = roster_entries(&records);
    let stats = load_stats(&args.stats)?;
    eprintln!(
        "Loaded {} roster records and {} stats records",
        roster.len(),
        stats.len()
    );

    let resolver = MatchResolver::new(config);
    let result = resolver.resolve(&roster, &stats);
    let report = ResolutionReport::new(&result, resolver.config(), roster.len(), stats.len());

    if let Some(ref path) = args.report {
        save_json_pretty(path, &report)?;
        eprintln!("Wrote report to {}", path.display());
    }

    match format {
        OutputFormat::Json => print_json(&report),
        _ => {
            let rows = build_outcome_rows(&result, args.all);
            if rows.is_empty() {
                eprintln!("Nothing to review: every roster entry matched with high confidence.");
            } else {
                print_rows(rows, format)?;
            }
        }
    }

    eprintln!(
        "\nMatched {} of {} ({} exact, {} fuzzy); {} below {:.2} need review, {} unmatched, {} dropped without an id",
        report.counts.matched,
        roster.len(),
        report.counts.exact,
        report.counts.fuzzy,
        report.counts.review,
        report.review_threshold,
        report.counts.unmatched,
        report.counts.dropped
    );

    Ok(())
}
