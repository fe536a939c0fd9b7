//! The `apply` subcommand: resolve, back up the roster, then rewrite its
//! `person_id` values to the statistics identifiers.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rollcall_lib::store::{
    apply_mapping, backup_path, load_roster, load_stats, roster_entries, save_json_pretty,
};
use rollcall_lib::{MatchConfig, MatchResolver};

use crate::output::{build_change_rows, build_outcome_rows, print_json, print_rows, OutputFormat};

#[derive(Args)]
pub struct ApplyArgs {
    /// Roster JSON file to update in place
    #[arg(long)]
    pub roster: PathBuf,

    /// Speaker statistics JSON file holding the target identifiers
    #[arg(long)]
    pub stats: PathBuf,

    /// Dry run: show the changes without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip writing `<roster>.backup.json` before overwriting the roster
    #[arg(long)]
    pub no_backup: bool,
}

pub fn run(args: &ApplyArgs, config: MatchConfig, format: &OutputFormat) -> Result<()> {
    let mut records = load_roster(&args.roster)?;
    let roster = roster_entries(&records);
    let stats = load_stats(&args.stats)?;

    let result = MatchResolver::new(config).resolve(&roster, &stats);

    let attention = build_outcome_rows(&result, false);
    if !attention.is_empty() && *format != OutputFormat::Json {
        eprintln!("Review items and unmatched roster entries:");
        print_rows(attention, format)?;
    }

    if !args.dry_run && !args.no_backup {
        let backup = backup_path(&args.roster);
        save_json_pretty(&backup, &records)?;
        eprintln!("Backed up original roster to {}", backup.display());
    }

    let summary = apply_mapping(&mut records, &result.mapping);

    match format {
        OutputFormat::Json => print_json(&summary),
        _ => {
            if !summary.changes.is_empty() {
                print_rows(build_change_rows(&summary), format)?;
            }
        }
    }

    if args.dry_run {
        eprintln!(
            "DRY RUN: Would update {} of {} records ({} unchanged).",
            summary.updated, summary.processed, summary.unchanged
        );
        return Ok(());
    }

    save_json_pretty(&args.roster, &records)?;
    eprintln!(
        "Updated {} of {} records in {} ({} unchanged).",
        summary.updated,
        summary.processed,
        args.roster.display(),
        summary.unchanged
    );
    if summary.unchanged > 0 {
        eprintln!("Some records could not be matched; consider an alias entry or a lower --match-threshold.");
    }

    Ok(())
}
