use crate::model::{MatchMethod, ReconSummary, RowOutcome};

/// Compute summary statistics from per-row outcomes.
pub fn compute_summary(outcomes: &[RowOutcome]) -> ReconSummary {
    let mut summary = ReconSummary {
        total_rows: outcomes.len(),
        ..ReconSummary::default()
    };

    for o in outcomes {
        match o.method {
            None => summary.skipped += 1,
            Some(MatchMethod::ExactDescription) => summary.matched_exact += 1,
            Some(MatchMethod::KeywordOrCode) => summary.matched_keyword += 1,
            Some(MatchMethod::Fuzzy(_)) => summary.matched_fuzzy += 1,
            Some(MatchMethod::None) => summary.unmatched += 1,
        }

        let c = &o.row.changed;
        let by_field = &mut summary.changed_by_field;
        by_field.tax_code += c.tax_code as usize;
        by_field.tax_rate += c.tax_rate as usize;
        by_field.tax_regime += c.tax_regime as usize;
        by_field.special_code += c.special_code as usize;
        summary.cells_changed += c.count();
    }

    summary
}
