use crate::config::MatchPolicy;
use crate::evidence::compute_summary;
use crate::matcher::match_item;
use crate::model::{AuditRow, ReconMeta, ReconResult, RowOutcome};
use crate::normalize::{normalize_field, normalize_special_code};
use crate::store::ReferenceStore;

/// Run reconciliation over every row. Returns annotated rows + summary.
pub fn run(rows: &[AuditRow], store: &ReferenceStore, policy: &MatchPolicy) -> ReconResult {
    let outcomes: Vec<RowOutcome> = rows
        .iter()
        .map(|row| reconcile_row(row, store, policy))
        .collect();

    let summary = compute_summary(&outcomes);
    log::info!(
        "reconciled {} rows against {} references: {} matched, {} unmatched, {} cells changed",
        summary.total_rows,
        store.len(),
        summary.matched(),
        summary.unmatched,
        summary.cells_changed,
    );

    ReconResult {
        meta: ReconMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            store_size: store.len(),
            fuzzy_threshold: policy.fuzzy_threshold,
            min_keyword_overlap: policy.min_keyword_overlap,
        },
        summary,
        rows: outcomes.into_iter().map(|o| o.row).collect(),
    }
}

/// Annotated copies of `rows`; the input is left untouched.
pub fn reconcile(rows: &[AuditRow], store: &ReferenceStore, policy: &MatchPolicy) -> Vec<AuditRow> {
    rows.iter()
        .map(|row| reconcile_row(row, store, policy).row)
        .collect()
}

/// Match one row and overwrite the fields that differ from the reference.
pub fn reconcile_row(row: &AuditRow, store: &ReferenceStore, policy: &MatchPolicy) -> RowOutcome {
    // Rows without a description pass through unannotated
    if !row.has_description() {
        return RowOutcome {
            row: row.clone(),
            method: None,
        };
    }

    let mut out = row.clone();
    out.tax_code = normalize_field(&row.tax_code);
    out.tax_rate = normalize_field(&row.tax_rate);
    out.tax_regime = normalize_field(&row.tax_regime);
    out.special_code = normalize_special_code(Some(&row.special_code));
    out.changed = Default::default();

    let result = match_item(&row.description, &out.tax_code, store, policy);

    if let Some((key, reference)) = result.reference {
        out.changed.tax_code = overwrite(&mut out.tax_code, &reference.tax_code);
        out.changed.tax_rate = overwrite(&mut out.tax_rate, &reference.tax_rate);
        out.changed.tax_regime = overwrite(&mut out.tax_regime, &reference.tax_regime);
        out.changed.special_code = overwrite(&mut out.special_code, &reference.special_code);
        log::debug!(
            "'{}' -> {} '{key}' ({} fields changed)",
            row.description.trim(),
            result.method,
            out.changed.count(),
        );
    } else {
        log::debug!("'{}' -> no match", row.description.trim());
    }

    out.matched_reference = Some(result.provenance());
    out.match_score = Some(result.score);

    RowOutcome {
        row: out,
        method: Some(result.method),
    }
}

fn overwrite(current: &mut String, reference: &str) -> bool {
    if current == reference {
        false
    } else {
        *current = reference.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchMethod, ReferenceRecord};

    fn arroz_store() -> ReferenceStore {
        vec![(
            "arroz tipo 1",
            ReferenceRecord::new("1006", "12", "T1", Some("41")),
        )]
        .into_iter()
        .collect()
    }

    #[test]
    fn exact_match_overwrites_differing_fields() {
        let rows = vec![AuditRow::new("Arroz Tipo 1", "1006", "7", "", "")];
        let out = reconcile(&rows, &arroz_store(), &MatchPolicy::default());
        let r = &out[0];

        assert_eq!(r.tax_code, "1006");
        assert!(!r.changed.tax_code);
        assert_eq!(r.tax_rate, "12");
        assert!(r.changed.tax_rate);
        assert_eq!(r.tax_regime, "T1");
        assert!(r.changed.tax_regime);
        assert_eq!(r.special_code, "41");
        assert!(r.changed.special_code);
        assert_eq!(r.matched_reference.as_deref(), Some("ExactDescription: arroz tipo 1"));
        assert_eq!(r.match_score, Some(100));

        // Input untouched
        assert_eq!(rows[0].tax_rate, "7");
        assert_eq!(rows[0].matched_reference, None);
    }

    #[test]
    fn unmatched_row_only_normalized() {
        let rows = vec![AuditRow::new(" Vassoura ", " 9603 ", "18 ", "", "12.0")];
        let out = reconcile(&rows, &arroz_store(), &MatchPolicy::default());
        let r = &out[0];
        assert_eq!(r.tax_code, "9603");
        assert_eq!(r.tax_rate, "18");
        assert_eq!(r.special_code, "12");
        assert!(!r.changed.any());
        assert_eq!(r.matched_reference.as_deref(), Some("no match found"));
        assert_eq!(r.match_score, Some(0));
    }

    #[test]
    fn blank_description_passes_through() {
        let rows = vec![AuditRow::new("   ", "1006", " 7 ", "", "")];
        let out = reconcile(&rows, &arroz_store(), &MatchPolicy::default());
        assert_eq!(out[0], rows[0]);
        assert_eq!(out[0].matched_reference, None);
        assert_eq!(out[0].match_score, None);
        assert!(!out[0].changed.any());
    }

    #[test]
    fn special_code_float_artifact_is_not_a_change() {
        let rows = vec![AuditRow::new("arroz tipo 1", "1006", "12", "T1", "41.0")];
        let out = reconcile(&rows, &arroz_store(), &MatchPolicy::default());
        assert_eq!(out[0].special_code, "41");
        assert!(!out[0].changed.any());
    }

    #[test]
    fn second_pass_changes_nothing() {
        let rows = vec![
            AuditRow::new("Arroz Tipo 1", "1006", "7", "", ""),
            AuditRow::new("arroz tipo 1 parboilizado", "", "", "", ""),
            AuditRow::new("", "", "", "", ""),
        ];
        let store = arroz_store();
        let policy = MatchPolicy::default();
        let first = reconcile(&rows, &store, &policy);
        assert!(first[0].changed.any());
        assert!(first[1].changed.any());

        let second = reconcile(&first, &store, &policy);
        for r in &second {
            assert!(!r.changed.any(), "row '{}' changed on second pass", r.description);
        }
    }

    #[test]
    fn extras_carried_through() {
        let mut row = AuditRow::new("Arroz Tipo 1", "1006", "12", "T1", "41");
        row.extra = vec![("Qtd".into(), "3".into())];
        let out = reconcile(&[row], &arroz_store(), &MatchPolicy::default());
        assert_eq!(out[0].extra, vec![("Qtd".to_string(), "3".to_string())]);
    }

    #[test]
    fn run_summary() {
        let rows = vec![
            AuditRow::new("Arroz Tipo 1", "1006", "7", "", ""),
            AuditRow::new("arroz tipo 1 parboilizado", "", "12", "T1", "41"),
            // one shared keyword, close by edit distance
            AuditRow::new("arroz tipo1", "", "12", "T1", "41"),
            AuditRow::new("Detergente", "3402", "18", "T", "0"),
            AuditRow::new("", "", "", "", ""),
        ];
        let result = run(&rows, &arroz_store(), &MatchPolicy::default());
        let s = &result.summary;
        assert_eq!(s.total_rows, 5);
        assert_eq!(s.skipped, 1);
        assert_eq!(s.matched_exact, 1);
        assert_eq!(s.matched_keyword, 1);
        assert_eq!(s.matched_fuzzy, 1);
        assert_eq!(s.unmatched, 1);
        assert_eq!(s.changed_by_field.tax_rate, 1);
        assert_eq!(s.changed_by_field.tax_code, 2);
        assert_eq!(s.cells_changed, 5);
        assert_eq!(result.meta.store_size, 1);
        assert_eq!(result.rows.len(), 5);
    }

    #[test]
    fn method_recorded_on_outcome() {
        let row = AuditRow::new("arroz tipo 1", "1006", "12", "T1", "41");
        let outcome = reconcile_row(&row, &arroz_store(), &MatchPolicy::default());
        assert_eq!(outcome.method, Some(MatchMethod::ExactDescription));

        let blank = AuditRow::default();
        assert_eq!(reconcile_row(&blank, &arroz_store(), &MatchPolicy::default()).method, None);
    }
}
