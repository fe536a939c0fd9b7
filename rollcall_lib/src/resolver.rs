//! Two-phase identity resolution between a roster and a statistics collection.
//!
//! Phase 1 pairs entries whose normalized names are identical, first match
//! wins in stats order. Phase 2 takes each remaining roster entry, considers
//! the unclaimed stats entries sharing its first name token and commits the
//! best one scoring at least `match_threshold`. Fuzzy matches below
//! `review_threshold` are committed and also queued for review.
//!
//! Matching is greedy in roster order, not a globally optimal assignment.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::config::MatchConfig;
use crate::normalize::{NameNormalizer, NormalizedName};
use crate::record::{PersonId, RosterEntry, StatEntry};
use crate::similarity::score;

/// How an assignment was found.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    Exact,
    Fuzzy,
}

/// One committed roster -> stats pairing.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MatchAssignment {
    pub old_id: PersonId,
    pub new_id: PersonId,
    pub similarity: f64,
    pub roster_name: String,
    pub matched_name: String,
    pub phase: MatchPhase,
}

/// A committed assignment below the review threshold. Still part of the mapping.
pub type ReviewItem = MatchAssignment;

/// Outcome of one resolution run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionResult {
    /// old_id -> new_id for every committed assignment.
    pub mapping: BTreeMap<PersonId, PersonId>,
    /// Committed assignments in commit order (all exact ones, then fuzzy ones).
    pub assignments: Vec<MatchAssignment>,
    pub review_queue: Vec<ReviewItem>,
    /// Roster entries with an identifier that found no partner, in roster order.
    pub unmatched: Vec<RosterEntry>,
    /// Records on either side skipped for lack of an identifier.
    pub dropped: usize,
}

impl ResolutionResult {
    pub fn exact_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.phase == MatchPhase::Exact)
            .count()
    }

    pub fn fuzzy_count(&self) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.phase == MatchPhase::Fuzzy)
            .count()
    }
}

/// An entry admitted to the matching pool.
struct PoolEntry<'a> {
    name: &'a str,
    id: &'a PersonId,
    normalized: NormalizedName,
}

/// Resolves roster identities against stats identities under a fixed config.
#[derive(Debug, Clone, Default)]
pub struct MatchResolver {
    config: MatchConfig,
}

impl MatchResolver {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Run both phases over the two collections.
    ///
    /// Input order matters: phase 1 takes the first unclaimed stats entry
    /// with an identical name, and roster entries are served in order in
    /// both phases. Records without an identifier are skipped and only
    /// counted in [`ResolutionResult::dropped`].
    pub fn resolve(&self, roster: &[RosterEntry], stats: &[StatEntry]) -> ResolutionResult {
        let normalizer = NameNormalizer::from_config(&self.config);
        let mut result = ResolutionResult::default();

        let roster_pool = build_pool(
            roster.iter().map(|r| (r.name.as_str(), r.person_id.as_ref())),
            &normalizer,
            &mut result.dropped,
        );
        let stats_pool = build_pool(
            stats.iter().map(|s| (s.name.as_str(), s.person_id.as_ref())),
            &normalizer,
            &mut result.dropped,
        );

        let mut roster_claimed = vec![false; roster_pool.len()];
        let mut stats_claimed = vec![false; stats_pool.len()];

        // Phase 1: exact normalized-name matches.
        let mut by_name: HashMap<&NormalizedName, VecDeque<usize>> = HashMap::new();
        for (si, entry) in stats_pool.iter().enumerate() {
            if !entry.normalized.is_empty() {
                by_name.entry(&entry.normalized).or_default().push_back(si);
            }
        }

        for (ri, entry) in roster_pool.iter().enumerate() {
            if entry.normalized.is_empty() {
                continue;
            }
            let Some(si) = by_name
                .get_mut(&entry.normalized)
                .and_then(|queue| queue.pop_front())
            else {
                continue;
            };
            roster_claimed[ri] = true;
            stats_claimed[si] = true;
            self.commit(&mut result, entry, &stats_pool[si], 1.0, MatchPhase::Exact);
        }

        // Phase 2: fuzzy matches among entries sharing a first token.
        let mut by_first_token: HashMap<&str, Vec<usize>> = HashMap::new();
        for (si, entry) in stats_pool.iter().enumerate() {
            if stats_claimed[si] {
                continue;
            }
            if let Some(token) = entry.normalized.first_token() {
                by_first_token.entry(token).or_default().push(si);
            }
        }

        for (ri, entry) in roster_pool.iter().enumerate() {
            if roster_claimed[ri] {
                continue;
            }

            let candidates = entry
                .normalized
                .first_token()
                .and_then(|token| by_first_token.get(token));

            let mut best: Option<(usize, f64)> = None;
            let mut best_similarity = self.config.match_threshold;
            for &si in candidates.into_iter().flatten() {
                if stats_claimed[si] {
                    continue;
                }
                let similarity = score(&entry.normalized, &stats_pool[si].normalized);
                // `>=` lets a later candidate with an equal score take over.
                if similarity >= best_similarity {
                    best_similarity = similarity;
                    best = Some((si, similarity));
                }
            }

            match best {
                Some((si, similarity)) => {
                    roster_claimed[ri] = true;
                    stats_claimed[si] = true;
                    let assignment =
                        self.commit(&mut result, entry, &stats_pool[si], similarity, MatchPhase::Fuzzy);
                    if similarity < self.config.review_threshold {
                        result.review_queue.push(assignment);
                    }
                }
                None => {
                    tracing::debug!("No match for {} ({})", entry.name, entry.id);
                    result.unmatched.push(RosterEntry {
                        name: entry.name.to_string(),
                        person_id: Some(entry.id.clone()),
                    });
                }
            }
        }

        tracing::info!(
            exact = result.exact_count(),
            fuzzy = result.fuzzy_count(),
            review = result.review_queue.len(),
            unmatched = result.unmatched.len(),
            dropped = result.dropped,
            "Resolution complete"
        );

        result
    }

    fn commit(
        &self,
        result: &mut ResolutionResult,
        roster: &PoolEntry<'_>,
        stat: &PoolEntry<'_>,
        similarity: f64,
        phase: MatchPhase,
    ) -> MatchAssignment {
        tracing::debug!(
            "{:?} match: {} -> {} ({:.3}), id {} -> {}",
            phase,
            roster.name,
            stat.name,
            similarity,
            roster.id,
            stat.id
        );

        if let Some(previous) = result.mapping.insert(roster.id.clone(), stat.id.clone()) {
            tracing::warn!(
                "Roster id {} appears more than once; mapping to {} replaces {}",
                roster.id,
                stat.id,
                previous
            );
        }

        let assignment = MatchAssignment {
            old_id: roster.id.clone(),
            new_id: stat.id.clone(),
            similarity,
            roster_name: roster.name.to_string(),
            matched_name: stat.name.to_string(),
            phase,
        };
        result.assignments.push(assignment.clone());
        assignment
    }
}

/// Normalize every record that has an identifier; count the rest as dropped.
fn build_pool<'a>(
    records: impl Iterator<Item = (&'a str, Option<&'a PersonId>)>,
    normalizer: &NameNormalizer<'_>,
    dropped: &mut usize,
) -> Vec<PoolEntry<'a>> {
    let mut pool = Vec::new();
    for (name, id) in records {
        match id {
            Some(id) => pool.push(PoolEntry {
                name,
                id,
                normalized: normalizer.normalize(name),
            }),
            None => {
                tracing::debug!("Dropping record without identifier: {}", name);
                *dropped += 1;
            }
        }
    }
    pool
}
