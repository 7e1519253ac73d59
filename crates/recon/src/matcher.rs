use crate::config::MatchPolicy;
use crate::keywords::{extract_keywords, overlap};
use crate::model::{MatchMethod, MatchResult, ReferenceRecord};
use crate::normalize::normalize_description;
use crate::store::ReferenceStore;

/// Resolve one item against the store.
///
/// Tiers run in order and the first to produce a candidate wins: exact
/// description, then keyword overlap / tax code equality (best score over
/// the whole store), then fuzzy similarity. Ties always go to the entry that
/// comes first in store order.
pub fn match_item<'a>(
    description: &str,
    tax_code: &str,
    store: &'a ReferenceStore,
    policy: &MatchPolicy,
) -> MatchResult<'a> {
    if let Some(hit) = match_exact(description, store) {
        return hit;
    }
    if let Some(hit) = match_keyword_or_code(description, tax_code, store, policy) {
        return hit;
    }
    if let Some(hit) = match_fuzzy(description, store, policy) {
        return hit;
    }
    MatchResult::none()
}

/// Case-insensitive description equality.
pub fn match_exact<'a>(description: &str, store: &'a ReferenceStore) -> Option<MatchResult<'a>> {
    let needle = normalize_description(description);
    store
        .iter()
        .find(|(key, _)| normalize_description(key) == needle)
        .map(|(key, record)| MatchResult {
            reference: Some((key, record)),
            method: MatchMethod::ExactDescription,
            score: 100,
        })
}

/// Keyword overlap and/or tax code equality, scored over every entry.
pub fn match_keyword_or_code<'a>(
    description: &str,
    tax_code: &str,
    store: &'a ReferenceStore,
    policy: &MatchPolicy,
) -> Option<MatchResult<'a>> {
    let item_keywords = extract_keywords(description, policy);
    let item_code = tax_code.trim();

    let mut best: Option<(u32, &'a str, &'a ReferenceRecord)> = None;

    for (key, record) in store.iter() {
        let shared = overlap(&item_keywords, &extract_keywords(key, policy));
        let ref_code = record.tax_code.trim();
        let code_match = !ref_code.is_empty() && ref_code == item_code;

        if shared < policy.min_keyword_overlap && !code_match {
            continue;
        }

        let mut score = (shared as u32).saturating_mul(policy.keyword_weight);
        if code_match {
            score = score.saturating_add(policy.code_match_bonus);
        }

        // Strictly greater: earlier entries keep ties
        if best.map_or(true, |(top, _, _)| score > top) {
            best = Some((score, key, record));
        }
    }

    best.map(|(score, key, record)| {
        log::debug!("keyword/code candidate '{key}' scored {score}");
        MatchResult {
            reference: Some((key, record)),
            method: MatchMethod::KeywordOrCode,
            score: score.min(100) as u8,
        }
    })
}

/// Best similarity ratio at or above the policy threshold.
pub fn match_fuzzy<'a>(
    description: &str,
    store: &'a ReferenceStore,
    policy: &MatchPolicy,
) -> Option<MatchResult<'a>> {
    let mut best: Option<(u8, &'a str, &'a ReferenceRecord)> = None;

    for (key, record) in store.iter() {
        let score = similarity(description, key);
        if score < policy.fuzzy_threshold {
            continue;
        }
        if best.map_or(true, |(top, _, _)| score > top) {
            best = Some((score, key, record));
        }
    }

    best.map(|(score, key, record)| MatchResult {
        reference: Some((key, record)),
        method: MatchMethod::Fuzzy(score),
        score,
    })
}

/// Normalized Levenshtein similarity on trimmed, lower-cased text, 0-100.
pub fn similarity(a: &str, b: &str) -> u8 {
    let ratio = strsim::normalized_levenshtein(&normalize_description(a), &normalize_description(b));
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}
