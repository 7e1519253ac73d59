//! Column-name alias table.
//!
//! Spreadsheets arrive with hand-typed headings ("Descrição item",
//! "Aliq. ICMS", "TRIBUTAÇÃO", ...). Headings are normalized once at
//! ingestion and resolved through a fixed alias table to a canonical field.

use std::collections::HashMap;

use crate::error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Description,
    TaxCode,
    TaxRate,
    TaxRegime,
    SpecialCode,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Description,
        Field::TaxCode,
        Field::TaxRate,
        Field::TaxRegime,
        Field::SpecialCode,
    ];

    /// Column label used in exported reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::TaxCode => "Tax Code",
            Self::TaxRate => "Tax Rate",
            Self::TaxRegime => "Tax Regime",
            Self::SpecialCode => "Special Code",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized heading -> canonical field
const ALIASES: &[(&str, Field)] = &[
    ("descrição item", Field::Description),
    ("descricao item", Field::Description),
    ("descrição do item", Field::Description),
    ("descricao do item", Field::Description),
    ("descrição", Field::Description),
    ("descricao", Field::Description),
    ("produto", Field::Description),
    ("description", Field::Description),
    ("item description", Field::Description),
    ("ncm", Field::TaxCode),
    ("código ncm", Field::TaxCode),
    ("codigo ncm", Field::TaxCode),
    ("tax code", Field::TaxCode),
    ("tax_code", Field::TaxCode),
    ("aliq icms", Field::TaxRate),
    ("alíq icms", Field::TaxRate),
    ("aliquota icms", Field::TaxRate),
    ("alíquota icms", Field::TaxRate),
    ("aliquota", Field::TaxRate),
    ("alíquota", Field::TaxRate),
    ("tax rate", Field::TaxRate),
    ("tax_rate", Field::TaxRate),
    ("tributação", Field::TaxRegime),
    ("tributacao", Field::TaxRegime),
    ("regime", Field::TaxRegime),
    ("tax regime", Field::TaxRegime),
    ("tax_regime", Field::TaxRegime),
    ("cest", Field::SpecialCode),
    ("código cest", Field::SpecialCode),
    ("codigo cest", Field::SpecialCode),
    ("special code", Field::SpecialCode),
    ("special_code", Field::SpecialCode),
];

/// Trim, case-fold, drop quote/newline/period noise, collapse whitespace.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '\n' | '\r' | '.'))
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn resolve_header(raw: &str) -> Option<Field> {
    let key = normalize_header(raw);
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

/// Positions of the canonical fields within a header row, plus every
/// unrecognized column.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    fields: HashMap<Field, usize>,
    /// (position, original heading) of columns carried through untouched
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    /// First column resolving to a field wins; later duplicates are extras.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut map = Self::default();
        for (i, header) in headers.iter().enumerate() {
            match resolve_header(header) {
                Some(field) if !map.fields.contains_key(&field) => {
                    map.fields.insert(field, i);
                }
                _ => map.extras.push((i, header.trim().to_string())),
            }
        }
        map
    }

    pub fn position(&self, field: Field) -> Option<usize> {
        self.fields.get(&field).copied()
    }

    pub fn has(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn require(&self, required: &[Field], source: &str) -> Result<(), IoError> {
        for field in required {
            if !self.has(*field) {
                return Err(IoError::MissingColumn {
                    source: source.into(),
                    column: field.label().into(),
                });
            }
        }
        Ok(())
    }

    /// Cell for `field` in `row`, empty when the column or cell is absent
    pub fn get<'r>(&self, row: &'r [String], field: Field) -> Option<&'r str> {
        self.position(field)
            .and_then(|i| row.get(i))
            .map(|s| s.as_str())
    }

    pub fn extras(&self, row: &[String]) -> Vec<(String, String)> {
        self.extras
            .iter()
            .map(|(i, name)| (name.clone(), row.get(*i).cloned().unwrap_or_default()))
            .collect()
    }
}
