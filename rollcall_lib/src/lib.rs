//! Library layer for Rollcall: identity resolution between a member roster
//! and a name-keyed statistics collection.
//!
//! Names are normalized (alias table, title stripping, lowercasing), scored
//! with a first-token-gated gestalt ratio, and paired by a two-phase greedy
//! resolver. Loading and saving the JSON documents lives in [`store`].

pub mod config;
pub mod normalize;
pub mod record;
pub mod report;
pub mod resolver;
pub mod similarity;
pub mod store;

pub use config::{AliasTable, ConfigError, MatchConfig, TitleSet};
pub use normalize::{NameNormalizer, NormalizedName};
pub use record::{PersonId, RosterEntry, StatEntry};
pub use report::{ReportCounts, ResolutionReport};
pub use resolver::{MatchAssignment, MatchPhase, MatchResolver, ResolutionResult, ReviewItem};
pub use similarity::score;
pub use store::{apply_mapping, ApplySummary, IdChange, StoreError};
