//! Serializable summary of a resolution run.
//!
//! The JSON shape is pinned by `schema/resolution_report.schema.json`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::MatchConfig;
use crate::record::RosterEntry;
use crate::resolver::{MatchAssignment, ResolutionResult, ReviewItem};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReportCounts {
    pub roster: usize,
    pub stats: usize,
    pub matched: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub review: usize,
    pub unmatched: usize,
    pub dropped: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResolutionReport {
    pub generated_at: DateTime<Utc>,
    pub match_threshold: f64,
    pub review_threshold: f64,
    pub counts: ReportCounts,
    pub assignments: Vec<MatchAssignment>,
    pub review_queue: Vec<ReviewItem>,
    pub unmatched: Vec<RosterEntry>,
}

impl ResolutionReport {
    /// Build a report for a run over `roster_len` roster and `stats_len` stats records.
    pub fn new(
        result: &ResolutionResult,
        config: &MatchConfig,
        roster_len: usize,
        stats_len: usize,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            match_threshold: config.match_threshold,
            review_threshold: config.review_threshold,
            counts: ReportCounts {
                roster: roster_len,
                stats: stats_len,
                matched: result.assignments.len(),
                exact: result.exact_count(),
                fuzzy: result.fuzzy_count(),
                review: result.review_queue.len(),
                unmatched: result.unmatched.len(),
                dropped: result.dropped,
            },
            assignments: result.assignments.clone(),
            review_queue: result.review_queue.clone(),
            unmatched: result.unmatched.clone(),
        }
    }
}
