//! Matching configuration: alias table, honorific titles and thresholds.
//!
//! The built-in configuration is compiled in from `seed_data/name_aliases.yml`,
//! following the same `include_str!` pattern used for other seed files. A
//! caller-supplied YAML file with the same shape replaces it entirely.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Default minimum similarity for a fuzzy match to be committed.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.75;

/// Default similarity below which a committed match is queued for review.
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 0.85;

/// Error types for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Duplicate 'from' name in alias table: {0}")]
    DuplicateAlias(String),
    #[error("Empty title in title list")]
    EmptyTitle,
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("match_threshold ({match_threshold}) must not exceed review_threshold ({review_threshold})")]
    ThresholdOrder {
        match_threshold: f64,
        review_threshold: f64,
    },
}

/// Exact raw name -> canonical replacement name.
///
/// Keys are compared verbatim, so `"Ed Davey"` does not match `"ed davey"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    /// Build a table from `(from, to)` pairs, rejecting duplicate keys.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries = HashMap::new();
        for (from, to) in pairs {
            let from = from.into();
            if entries.contains_key(&from) {
                return Err(ConfigError::DuplicateAlias(from));
            }
            entries.insert(from, to.into());
        }
        Ok(Self { entries })
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries.get(raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Ordered list of honorifics removed during normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleSet {
    titles: Vec<String>,
}

impl TitleSet {
    /// Build a title set, preserving order and dropping repeats.
    pub fn new<I, S>(titles: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for title in titles {
            let title = title.into();
            if title.trim().is_empty() {
                return Err(ConfigError::EmptyTitle);
            }
            if !out.contains(&title) {
                out.push(title);
            }
        }
        Ok(Self { titles: out })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.titles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

/// Everything a resolution run needs besides the two record collections.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchConfig {
    pub aliases: AliasTable,
    pub titles: TitleSet,
    pub match_threshold: f64,
    pub review_threshold: f64,
}

impl MatchConfig {
    /// Config with the given tables and default thresholds.
    pub fn new(aliases: AliasTable, titles: TitleSet) -> Self {
        Self {
            aliases,
            titles,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
        }
    }

    pub fn with_match_threshold(mut self, threshold: f64) -> Self {
        self.match_threshold = threshold;
        self
    }

    pub fn with_review_threshold(mut self, threshold: f64) -> Self {
        self.review_threshold = threshold;
        self
    }

    /// Check both thresholds lie in `[0, 1]` and are correctly ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_threshold("match_threshold", self.match_threshold)?;
        validate_threshold("review_threshold", self.review_threshold)?;
        if self.match_threshold > self.review_threshold {
            return Err(ConfigError::ThresholdOrder {
                match_threshold: self.match_threshold,
                review_threshold: self.review_threshold,
            });
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    /// The built-in seed configuration, or empty tables if the embedded
    /// seed fails to parse.
    fn default() -> Self {
        load_builtin_config().unwrap_or_else(|e| {
            tracing::warn!("Built-in name alias seed is invalid ({}); using empty tables", e);
            Self::new(AliasTable::default(), TitleSet::default())
        })
    }
}

/// Reject thresholds that are NaN or outside `[0, 1]`.
pub fn validate_threshold(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

/// On-disk shape of a config file.
#[derive(Deserialize, Debug)]
struct ConfigFile {
    #[serde(default)]
    aliases: Vec<AliasEntry>,
    #[serde(default)]
    titles: Vec<String>,
    match_threshold: Option<f64>,
    review_threshold: Option<f64>,
}

#[derive(Deserialize, Debug)]
struct AliasEntry {
    from: String,
    to: String,
}

/// Parse and validate a config from YAML content.
pub fn parse_config(yaml_content: &str) -> Result<MatchConfig, ConfigError> {
    let file: ConfigFile = serde_yml::from_str(yaml_content)?;

    let aliases = AliasTable::from_pairs(file.aliases.into_iter().map(|a| (a.from, a.to)))?;
    let titles = TitleSet::new(file.titles)?;

    let config = MatchConfig {
        aliases,
        titles,
        match_threshold: file.match_threshold.unwrap_or(DEFAULT_MATCH_THRESHOLD),
        review_threshold: file.review_threshold.unwrap_or(DEFAULT_REVIEW_THRESHOLD),
    };
    config.validate()?;
    Ok(config)
}

/// Load and validate a config file from disk.
pub fn load_config(path: &Path) -> Result<MatchConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&content)
}

/// Load the alias and title seed embedded at compile time.
pub fn load_builtin_config() -> Result<MatchConfig, ConfigError> {
    let yaml_content = include_str!("../../seed_data/name_aliases.yml");
    parse_config(yaml_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_loads() {
        let config = load_builtin_config().unwrap();
        assert_eq!(config.aliases.len(), 11);
        assert_eq!(config.aliases.get("Al Carns"), Some("Alistair Carns"));
        assert_eq!(config.aliases.get("Mr Tanmanjeet Singh Dhesi"), Some("Tan Dhesi"));
        let titles: Vec<&str> = config.titles.iter().collect();
        assert_eq!(titles, vec!["Ms", "Mrs", "Mr", "Dr", "Sir", "Dame", "Lady"]);
        assert_eq!(config.match_threshold, 0.75);
        assert_eq!(config.review_threshold, 0.85);
    }

    #[test]
    fn test_default_matches_builtin() {
        assert_eq!(MatchConfig::default(), load_builtin_config().unwrap());
    }

    #[test]
    fn test_alias_keys_are_case_sensitive() {
        let table = AliasTable::from_pairs([("Ed Davey", "Edward Davey")]).unwrap();
        assert_eq!(table.get("Ed Davey"), Some("Edward Davey"));
        assert_eq!(table.get("ed davey"), None);
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let yaml = r#"
aliases:
  - from: "Ed Davey"
    to: "Edward Davey"
  - from: "Ed Davey"
    to: "Eddie Davey"
"#;
        let result = parse_config(yaml);
        assert!(matches!(result.unwrap_err(), ConfigError::DuplicateAlias(_)));
    }

    #[test]
    fn test_empty_title_rejected() {
        let yaml = r#"
titles: ["Mr", "  "]
"#;
        assert!(matches!(parse_config(yaml).unwrap_err(), ConfigError::EmptyTitle));
    }

    #[test]
    fn test_repeated_title_kept_once() {
        let titles = TitleSet::new(["Mr", "Dr", "Mr"]).unwrap();
        assert_eq!(titles.iter().collect::<Vec<_>>(), vec!["Mr", "Dr"]);
    }

    #[test]
    fn test_missing_thresholds_use_defaults() {
        let config = parse_config("aliases: []\ntitles: []\n").unwrap();
        assert!(config.aliases.is_empty());
        assert!(config.titles.is_empty());
        assert_eq!(config.match_threshold, DEFAULT_MATCH_THRESHOLD);
        assert_eq!(config.review_threshold, DEFAULT_REVIEW_THRESHOLD);
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let result = parse_config("match_threshold: 1.5\n");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ThresholdOutOfRange { name: "match_threshold", .. }
        ));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        assert!(validate_threshold("review_threshold", f64::NAN).is_err());
    }

    #[test]
    fn test_threshold_order_enforced() {
        let config = MatchConfig::default()
            .with_match_threshold(0.9)
            .with_review_threshold(0.8);
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::ThresholdOrder { .. }
        ));
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/rollcall.yml"));
        assert!(matches!(result.unwrap_err(), ConfigError::Io { .. }));
    }
}
