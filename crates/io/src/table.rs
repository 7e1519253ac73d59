use std::path::Path;

use taxaudit_recon::{AuditRow, ReferenceRecord};

use crate::columns::{ColumnMap, Field};
use crate::error::IoError;

/// Columns every reference or audit table must provide.
pub const REQUIRED: [Field; 3] = [Field::Description, Field::TaxCode, Field::TaxRate];

/// Untyped table as read from a spreadsheet or delimited file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// First non-blank record becomes the header; blank records are dropped.
    pub fn from_records(records: Vec<Vec<String>>, source: &str) -> Result<Self, IoError> {
        let mut iter = records
            .into_iter()
            .filter(|r| r.iter().any(|c| !c.trim().is_empty()));

        let headers = iter
            .next()
            .ok_or_else(|| IoError::EmptyTable(source.into()))?;
        let rows = iter.collect();

        Ok(Self { headers, rows })
    }

    pub fn column_map(&self) -> ColumnMap {
        ColumnMap::from_headers(&self.headers)
    }
}

/// Read a table from disk, dispatching on extension: `.csv`/`.tsv`/`.txt`
/// go through the delimited reader, everything else through calamine.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "tsv" | "txt" => crate::csv::read_table(path),
        _ => crate::xlsx::read_table(path, sheet),
    }
}

/// Reference rows from an imported table.
///
/// Tax regime falls back to the row's tax rate and special code to `"0"`
/// when the column is absent or the cell is blank. Rows without a
/// description are dropped.
pub fn reference_rows(table: &RawTable, source: &str) -> Result<Vec<(String, ReferenceRecord)>, IoError> {
    let map = table.column_map();
    map.require(&REQUIRED, source)?;

    let mut out = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let description = map.get(row, Field::Description).unwrap_or("").trim();
        if description.is_empty() {
            continue;
        }
        let tax_code = map.get(row, Field::TaxCode).unwrap_or("");
        let tax_rate = map.get(row, Field::TaxRate).unwrap_or("");
        let tax_regime = map
            .get(row, Field::TaxRegime)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(tax_rate);
        let special_code = map.get(row, Field::SpecialCode);

        out.push((
            description.to_string(),
            ReferenceRecord::new(tax_code, tax_rate, tax_regime, special_code),
        ));
    }

    Ok(out)
}

/// Audit rows from an input table. Rows keep their order; rows without a
/// description are kept so the report mirrors the input.
pub fn audit_rows(table: &RawTable, source: &str) -> Result<Vec<AuditRow>, IoError> {
    let map = table.column_map();
    map.require(&REQUIRED, source)?;

    Ok(table
        .rows
        .iter()
        .map(|row| {
            let cell = |f: Field| map.get(row, f).unwrap_or("");
            let mut audit = AuditRow::new(
                cell(Field::Description),
                cell(Field::TaxCode),
                cell(Field::TaxRate),
                cell(Field::TaxRegime),
                cell(Field::SpecialCode),
            );
            audit.extra = map.extras(row);
            audit
        })
        .collect())
}
