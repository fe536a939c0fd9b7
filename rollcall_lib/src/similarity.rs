//! Similarity scoring between normalized names.
//!
//! Tiers, checked in order:
//! 1. Identical names score `1.0`
//! 2. Same first and last token score [`FIRST_LAST_MATCH_SCORE`]
//! 3. Different first tokens score `0.0` (first-token gate)
//! 4. Otherwise the gestalt (Ratcliff/Obershelp) ratio of the full strings

use std::collections::HashMap;

use crate::normalize::NormalizedName;

/// Score for names agreeing on first and last token but differing in between
/// (middle names, initials).
pub const FIRST_LAST_MATCH_SCORE: f64 = 0.95;

/// Similarity of two normalized names, in `[0, 1]`. Symmetric.
pub fn score(a: &NormalizedName, b: &NormalizedName) -> f64 {
    if a == b {
        return 1.0;
    }

    if let (Some(a_first), Some(b_first)) = (a.first_token(), b.first_token()) {
        if a_first == b_first && a.last_token() == b.last_token() {
            return FIRST_LAST_MATCH_SCORE;
        }
        if a_first != b_first {
            return 0.0;
        }
    }

    gestalt_ratio(a.as_str(), b.as_str())
}

/// First-token gate: both names have a first token and they are equal.
///
/// Empty names have no tokens and never pass.
pub fn shares_first_token(a: &NormalizedName, b: &NormalizedName) -> bool {
    match (a.first_token(), b.first_token()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Gestalt pattern-matching ratio `2*M / (len(a) + len(b))`, where `M` is the
/// number of characters covered by recursively extracted longest common blocks.
///
/// Lengths count chars, not bytes. The arguments are put in a fixed order
/// first, so the result does not depend on which side is passed as `a`.
pub fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Sum of the sizes of all matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = find_longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest block `a[i..i+k] == b[j..j+k]` inside the given windows.
///
/// Ties go to the block starting earliest in `a`, then earliest in `b`.
fn find_longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    // j2len[j] = length of the match ending at a[i-1], b[j]
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_j2len = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| j2len.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_j2len.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        j2len = next_j2len;
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AliasTable, TitleSet};
    use crate::normalize::NameNormalizer;

    fn norm(raw: &str) -> NormalizedName {
        let aliases = AliasTable::from_pairs([("Al Carns", "Alistair Carns")]).unwrap();
        let titles = TitleSet::new(["Ms", "Mrs", "Mr", "Dr", "Sir", "Dame", "Lady"]).unwrap();
        NameNormalizer::new(&aliases, &titles).normalize(raw)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_scores_one() {
        assert_eq!(score(&norm("Mr John Smith"), &norm("John Smith")), 1.0);
    }

    #[test]
    fn test_first_last_match_sentinel() {
        assert_eq!(
            score(&norm("Mary Kelly Foy"), &norm("Mary Foy")),
            FIRST_LAST_MATCH_SCORE
        );
    }

    #[test]
    fn test_first_token_gate() {
        assert_eq!(score(&norm("Ben Carns"), &norm("Bob Carns")), 0.0);
        assert_eq!(score(&norm("Jane Doe"), &norm("Jan Doeson")), 0.0);
    }

    #[test]
    fn test_gate_lifted_by_alias() {
        assert_eq!(score(&norm("Al Carns"), &norm("Alistair Carns")), 1.0);
        assert_eq!(score(&norm("Al Carns"), &norm("Ben Carns")), 0.0);
    }

    #[test]
    fn test_gestalt_ratio_known_values() {
        // Reference values from the classic gestalt pattern matcher.
        assert!(approx(gestalt_ratio("abcd", "bcde"), 0.75));
        assert!(approx(gestalt_ratio("john smith", "john smyth"), 0.9));
        assert!(approx(gestalt_ratio("abc", "xyz"), 0.0));
        assert!(approx(gestalt_ratio("", ""), 1.0));
        assert!(approx(gestalt_ratio("abc", ""), 0.0));
    }

    #[test]
    fn test_gestalt_recurses_on_both_sides() {
        // longest block "cd", then "a" on the left and "f" on the right
        assert!(approx(gestalt_ratio("abcdef", "axcdyf"), 8.0 / 12.0));
    }

    #[test]
    fn test_gestalt_counts_chars_not_bytes() {
        assert!(approx(gestalt_ratio("séan", "sean"), 6.0 / 8.0));
    }

    #[test]
    fn test_fuzzy_score_same_first_token() {
        let s = score(&norm("John Smith"), &norm("John Smyth"));
        assert!(approx(s, 0.9));
    }

    #[test]
    fn test_score_symmetric() {
        let pairs = [
            ("John Smith", "John Smyth"),
            ("Jon Pearce", "Jonathan Pearce"),
            ("Mary Kelly Foy", "Mary Foy"),
            ("Sam Carling", "Sam Carlingford-Jones"),
            ("anna bab", "anna bba"),
        ];
        for (x, y) in pairs {
            let (a, b) = (norm(x), norm(y));
            assert_eq!(score(&a, &b), score(&b, &a), "asymmetric for {:?}", (x, y));
        }
    }

    #[test]
    fn test_score_bounded() {
        let names = ["", "a", "john smith", "john", "johnny smith jr", "jo"];
        for x in names {
            for y in names {
                let s = score(&norm(x), &norm(y));
                assert!((0.0..=1.0).contains(&s));
            }
        }
    }

    #[test]
    fn test_shares_first_token() {
        assert!(shares_first_token(&norm("John Smith"), &norm("John Smyth")));
        assert!(!shares_first_token(&norm("John Smith"), &norm("Jon Smith")));
        assert!(!shares_first_token(&norm(""), &norm("")));
        assert!(!shares_first_token(&norm(""), &norm("John")));
    }
}
