use serde::Serialize;

use crate::normalize::{normalize_field, normalize_special_code};

// ---------------------------------------------------------------------------
// Reference
// ---------------------------------------------------------------------------

/// Approved tax classification for one reference description.
///
/// All fields are text: tax codes keep leading zeros, rates keep their
/// decimal spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRecord {
    pub tax_code: String,
    pub tax_rate: String,
    pub tax_regime: String,
    pub special_code: String,
}

impl ReferenceRecord {
    /// Build a record with trimmed fields and a cleaned special code.
    pub fn new(tax_code: &str, tax_rate: &str, tax_regime: &str, special_code: Option<&str>) -> Self {
        Self {
            tax_code: normalize_field(tax_code),
            tax_rate: normalize_field(tax_rate),
            tax_regime: normalize_field(tax_regime),
            special_code: normalize_special_code(special_code),
        }
    }
}

// ---------------------------------------------------------------------------
// Audit rows
// ---------------------------------------------------------------------------

/// Which of the four tax fields a reconciliation pass overwrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangedFields {
    pub tax_code: bool,
    pub tax_rate: bool,
    pub tax_regime: bool,
    pub special_code: bool,
}

impl ChangedFields {
    pub fn count(&self) -> usize {
        [self.tax_code, self.tax_rate, self.tax_regime, self.special_code]
            .iter()
            .filter(|&&c| c)
            .count()
    }

    pub fn any(&self) -> bool {
        self.count() > 0
    }
}

/// One row of an input table under reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditRow {
    pub description: String,
    pub tax_code: String,
    pub tax_rate: String,
    pub tax_regime: String,
    pub special_code: String,
    /// Columns the ingestion layer did not recognize, in input order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<(String, String)>,

    pub changed: ChangedFields,
    /// `"<method>: <description>"` or `"no match found"`. `None` for rows
    /// skipped because they have no description.
    pub matched_reference: Option<String>,
    pub match_score: Option<u8>,
}

impl AuditRow {
    pub fn new(
        description: &str,
        tax_code: &str,
        tax_rate: &str,
        tax_regime: &str,
        special_code: &str,
    ) -> Self {
        Self {
            description: description.into(),
            tax_code: tax_code.into(),
            tax_rate: tax_rate.into(),
            tax_regime: tax_regime.into(),
            special_code: special_code.into(),
            ..Self::default()
        }
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "score", rename_all = "snake_case")]
pub enum MatchMethod {
    ExactDescription,
    KeywordOrCode,
    Fuzzy(u8),
    None,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactDescription => write!(f, "ExactDescription"),
            Self::KeywordOrCode => write!(f, "KeywordOrCode"),
            Self::Fuzzy(score) => write!(f, "Fuzzy({score})"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Outcome of matching one item against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    /// Matched store key and its record.
    pub reference: Option<(&'a str, &'a ReferenceRecord)>,
    pub method: MatchMethod,
    pub score: u8,
}

impl MatchResult<'_> {
    pub fn none() -> Self {
        Self {
            reference: None,
            method: MatchMethod::None,
            score: 0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.reference.is_some()
    }

    pub fn provenance(&self) -> String {
        match self.reference {
            Some((description, _)) => format!("{}: {description}", self.method),
            None => NO_MATCH.into(),
        }
    }
}

pub const NO_MATCH: &str = "no match found";

/// An annotated row plus the tier that resolved it. `method` is `None` for
/// rows skipped for lack of a description.
#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub row: AuditRow,
    pub method: Option<MatchMethod>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldChangeCounts {
    pub tax_code: usize,
    pub tax_rate: usize,
    pub tax_regime: usize,
    pub special_code: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_rows: usize,
    pub skipped: usize,
    pub matched_exact: usize,
    pub matched_keyword: usize,
    pub matched_fuzzy: usize,
    pub unmatched: usize,
    pub cells_changed: usize,
    pub changed_by_field: FieldChangeCounts,
}

impl ReconSummary {
    pub fn matched(&self) -> usize {
        self.matched_exact + self.matched_keyword + self.matched_fuzzy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub engine_version: String,
    pub run_at: String,
    pub store_size: usize,
    pub fuzzy_threshold: u8,
    pub min_keyword_overlap: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub rows: Vec<AuditRow>,
}
