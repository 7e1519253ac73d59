use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Match policy
// ---------------------------------------------------------------------------

/// Thresholds and weights that drive the matching tiers.
///
/// Every field has a default, so an empty TOML document (or an absent
/// `[policy]` table in the settings file) yields the standard policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatchPolicy {
    /// Minimum fuzzy ratio (0-100) for the fallback tier.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u8,
    /// Shared keywords needed to make a keyword-tier candidate.
    #[serde(default = "default_min_keyword_overlap")]
    pub min_keyword_overlap: usize,
    /// Score per shared keyword.
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: u32,
    /// Score bonus when the item's tax code equals the reference's.
    #[serde(default = "default_code_match_bonus")]
    pub code_match_bonus: u32,
    /// Tokens shorter than this (in characters) are not keywords.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
}

fn default_fuzzy_threshold() -> u8 {
    70
}

fn default_min_keyword_overlap() -> usize {
    2
}

fn default_keyword_weight() -> u32 {
    10
}

fn default_code_match_bonus() -> u32 {
    50
}

fn default_min_token_len() -> usize {
    3
}

fn default_stopwords() -> Vec<String> {
    ["de", "da", "do", "e", "em", "com", "ml"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            min_keyword_overlap: default_min_keyword_overlap(),
            keyword_weight: default_keyword_weight(),
            code_match_bonus: default_code_match_bonus(),
            min_token_len: default_min_token_len(),
            stopwords: default_stopwords(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchPolicy {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let policy: MatchPolicy =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.fuzzy_threshold > 100 {
            return Err(ReconError::ConfigValidation(format!(
                "fuzzy_threshold must be between 0 and 100, got {}",
                self.fuzzy_threshold
            )));
        }

        if self.min_keyword_overlap == 0 {
            return Err(ReconError::ConfigValidation(
                "min_keyword_overlap must be at least 1".into(),
            ));
        }

        if self.min_token_len == 0 {
            return Err(ReconError::ConfigValidation(
                "min_token_len must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
