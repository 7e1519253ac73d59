use std::collections::BTreeSet;

use crate::config::MatchPolicy;

/// Keyword set of a description under the default policy.
pub fn keywords(text: &str) -> BTreeSet<String> {
    extract_keywords(text, &MatchPolicy::default())
}

/// Lower-case, split on whitespace, drop stopwords and short tokens.
pub fn extract_keywords(text: &str, policy: &MatchPolicy) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() >= policy.min_token_len)
        .filter(|w| !policy.stopwords.iter().any(|s| s == w))
        .collect()
}

/// Number of keywords two sets share.
pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
    a.intersection(b).count()
}
