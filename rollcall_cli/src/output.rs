use anyhow::Result;
use rollcall_lib::{ApplySummary, MatchPhase, NormalizedName, ResolutionResult};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "csv" => OutputFormat::Csv,
            "markdown" | "md" => OutputFormat::Markdown,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
pub struct OutcomeRow {
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
    #[tabled(rename = "Roster Name")]
    #[serde(rename = "Roster Name")]
    roster_name: String,
    #[tabled(rename = "Matched Name")]
    #[serde(rename = "Matched Name")]
    matched_name: String,
    #[tabled(rename = "Old ID")]
    #[serde(rename = "Old ID")]
    old_id: String,
    #[tabled(rename = "New ID")]
    #[serde(rename = "New ID")]
    new_id: String,
    #[tabled(rename = "Similarity")]
    #[serde(rename = "Similarity")]
    similarity: String,
}

#[derive(Tabled, Serialize)]
pub struct ChangeRow {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    name: String,
    #[tabled(rename = "Old ID")]
    #[serde(rename = "Old ID")]
    old_id: String,
    #[tabled(rename = "New ID")]
    #[serde(rename = "New ID")]
    new_id: String,
}

#[derive(Tabled, Serialize)]
pub struct ScoreRow {
    #[tabled(rename = "Name A")]
    #[serde(rename = "Name A")]
    name_a: String,
    #[tabled(rename = "Normalized A")]
    #[serde(rename = "Normalized A")]
    normalized_a: String,
    #[tabled(rename = "Name B")]
    #[serde(rename = "Name B")]
    name_b: String,
    #[tabled(rename = "Normalized B")]
    #[serde(rename = "Normalized B")]
    normalized_b: String,
    #[tabled(rename = "Similarity")]
    #[serde(rename = "Similarity")]
    similarity: String,
}

// -- Row builders --

/// One row per roster outcome. Without `all`, only rows needing attention
/// (review queue and unmatched) are kept.
pub fn build_outcome_rows(result: &ResolutionResult, all: bool) -> Vec<OutcomeRow> {
    let mut rows = Vec::new();

    for assignment in &result.assignments {
        let status = if result.review_queue.contains(assignment) {
            "review"
        } else {
            match assignment.phase {
                MatchPhase::Exact => "exact",
                MatchPhase::Fuzzy => "fuzzy",
            }
        };
        if !all && status != "review" {
            continue;
        }
        rows.push(OutcomeRow {
            status: status.to_string(),
            roster_name: assignment.roster_name.clone(),
            matched_name: assignment.matched_name.clone(),
            old_id: assignment.old_id.to_string(),
            new_id: assignment.new_id.to_string(),
            similarity: format_similarity(assignment.similarity),
        });
    }

    for entry in &result.unmatched {
        rows.push(OutcomeRow {
            status: "unmatched".to_string(),
            roster_name: entry.name.clone(),
            matched_name: String::new(),
            old_id: entry
                .person_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            new_id: String::new(),
            similarity: String::new(),
        });
    }

    rows
}

pub fn build_change_rows(summary: &ApplySummary) -> Vec<ChangeRow> {
    summary
        .changes
        .iter()
        .map(|c| ChangeRow {
            name: c.name.clone(),
            old_id: c.old_id.to_string(),
            new_id: c.new_id.to_string(),
        })
        .collect()
}

pub fn build_score_row(
    name_a: &str,
    normalized_a: &NormalizedName,
    name_b: &str,
    normalized_b: &NormalizedName,
    similarity: f64,
) -> ScoreRow {
    ScoreRow {
        name_a: name_a.to_string(),
        normalized_a: normalized_a.to_string(),
        name_b: name_b.to_string(),
        normalized_b: normalized_b.to_string(),
        similarity: format_similarity(similarity),
    }
}

// -- Rendering --

/// Print rows as a table, markdown table or CSV. JSON callers print their
/// own payload with [`print_json`].
pub fn print_rows<T: Tabled + Serialize>(rows: Vec<T>, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for row in rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            println!("{}", table);
        }
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", Table::new(rows));
        }
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_similarity(similarity: f64) -> String {
    format!("{:.3}", similarity)
}
