//! Name normalization: alias substitution, title stripping, lowercasing.

use serde::Serialize;
use std::fmt;

use crate::config::{AliasTable, MatchConfig, TitleSet};

/// A canonicalized name, used both as an exact-match key and as scorer input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty name can never be matched.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    pub fn first_token(&self) -> Option<&str> {
        self.tokens().next()
    }

    pub fn last_token(&self) -> Option<&str> {
        self.tokens().last()
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Borrowing view over the alias and title tables of a [`MatchConfig`].
#[derive(Debug, Clone, Copy)]
pub struct NameNormalizer<'a> {
    aliases: &'a AliasTable,
    titles: &'a TitleSet,
}

impl<'a> NameNormalizer<'a> {
    pub fn new(aliases: &'a AliasTable, titles: &'a TitleSet) -> Self {
        Self { aliases, titles }
    }

    pub fn from_config(config: &'a MatchConfig) -> Self {
        Self::new(&config.aliases, &config.titles)
    }

    /// Normalize a raw name.
    ///
    /// Steps:
    /// 1. Replace the whole string if it is an alias key
    /// 2. For each title in order, remove every `"<title> "` and trim
    /// 3. Lowercase
    ///
    /// Whitespace-only input yields an empty name.
    pub fn normalize(&self, raw: &str) -> NormalizedName {
        let mut name = self.aliases.get(raw).unwrap_or(raw).to_string();

        for title in self.titles.iter() {
            let pattern = format!("{} ", title);
            name = name.replace(&pattern, "").trim().to_string();
        }

        NormalizedName(name.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> (AliasTable, TitleSet) {
        let aliases = AliasTable::from_pairs([
            ("Al Carns", "Alistair Carns"),
            ("Mr Tanmanjeet Singh Dhesi", "Tan Dhesi"),
        ])
        .unwrap();
        let titles = TitleSet::new(["Ms", "Mrs", "Mr", "Dr", "Sir", "Dame", "Lady"]).unwrap();
        (aliases, titles)
    }

    #[test]
    fn test_normalize_plain() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        assert_eq!(n.normalize("John Smith").as_str(), "john smith");
    }

    #[test]
    fn test_normalize_strips_title() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        assert_eq!(n.normalize("Mr John Smith"), n.normalize("John Smith"));
        assert_eq!(n.normalize("Mrs Jane Doe").as_str(), "jane doe");
    }

    #[test]
    fn test_normalize_strips_multiple_titles() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        assert_eq!(n.normalize("Dr Sir Lindsay Hoyle").as_str(), "lindsay hoyle");
    }

    #[test]
    fn test_title_needs_trailing_space() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        // "Mr" at the end of a name, or as a prefix of a word, is left alone.
        assert_eq!(n.normalize("Drew Hendry").as_str(), "drew hendry");
        assert_eq!(n.normalize("Smith Mr").as_str(), "smith mr");
    }

    #[test]
    fn test_normalize_applies_alias_before_titles() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        assert_eq!(n.normalize("Al Carns").as_str(), "alistair carns");
        assert_eq!(n.normalize("Mr Tanmanjeet Singh Dhesi").as_str(), "tan dhesi");
    }

    #[test]
    fn test_alias_is_whole_string_only() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        assert_eq!(n.normalize("Al Carns MP").as_str(), "al carns mp");
        assert_eq!(n.normalize("al carns").as_str(), "al carns");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        for raw in ["Mr John Smith", "Al Carns", "Dame Angela Eagle", "  Ms Jo White  "] {
            let once = n.normalize(raw);
            let twice = n.normalize(once.as_str());
            assert_eq!(once, twice, "normalize not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_normalize_empty_and_whitespace() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        assert!(n.normalize("").is_empty());
        assert!(n.normalize("   ").is_empty());
        assert!(n.normalize("Mr ").is_empty());
    }

    #[test]
    fn test_first_and_last_tokens() {
        let (aliases, titles) = tables();
        let n = NameNormalizer::new(&aliases, &titles);
        let name = n.normalize("Mary Kelly Foy");
        assert_eq!(name.first_token(), Some("mary"));
        assert_eq!(name.last_token(), Some("foy"));
        assert_eq!(n.normalize("").first_token(), None);
    }
}
