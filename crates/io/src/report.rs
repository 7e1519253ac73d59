//! Annotated report layout shared by the xlsx and CSV exporters.

use taxaudit_recon::AuditRow;

use crate::columns::Field;

const FLAG_HEADERS: [&str; 4] = [
    "Tax Code Changed",
    "Tax Rate Changed",
    "Tax Regime Changed",
    "Special Code Changed",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Bool(bool),
    Number(f64),
    Empty,
}

impl ReportCell {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            Self::Number(n) => n.to_string(),
            Self::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub value: ReportCell,
    /// Cell was overwritten from the reference store
    pub highlight: bool,
}

impl ReportEntry {
    fn plain(value: ReportCell) -> Self {
        Self { value, highlight: false }
    }

    fn text(s: &str) -> Self {
        Self::plain(ReportCell::Text(s.to_string()))
    }
}

/// Report rows: the five tax columns, unrecognized input columns, then the
/// four change flags, provenance and score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ReportEntry>>,
}

impl ReportTable {
    pub fn highlighted_cells(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.iter())
            .filter(|e| e.highlight)
            .count()
    }
}

pub fn build_report(rows: &[AuditRow]) -> ReportTable {
    // Union of extra column names in first-seen order
    let mut extras: Vec<&str> = Vec::new();
    for row in rows {
        for (name, _) in &row.extra {
            if !extras.contains(&name.as_str()) {
                extras.push(name);
            }
        }
    }

    let mut headers: Vec<String> = Field::ALL.iter().map(|f| f.label().to_string()).collect();
    headers.extend(extras.iter().map(|s| s.to_string()));
    headers.extend(FLAG_HEADERS.iter().map(|s| s.to_string()));
    headers.push("Matched Reference".into());
    headers.push("Match Score".into());

    let rows = rows
        .iter()
        .map(|row| {
            let changed = row.changed;
            let tracked = |value: &str, flag: bool| ReportEntry {
                value: ReportCell::Text(value.to_string()),
                highlight: flag,
            };

            let mut out = vec![
                ReportEntry::text(&row.description),
                tracked(&row.tax_code, changed.tax_code),
                tracked(&row.tax_rate, changed.tax_rate),
                tracked(&row.tax_regime, changed.tax_regime),
                tracked(&row.special_code, changed.special_code),
            ];

            for name in &extras {
                let value = row
                    .extra
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| ReportEntry::text(v))
                    .unwrap_or_else(|| ReportEntry::plain(ReportCell::Empty));
                out.push(value);
            }

            for flag in [changed.tax_code, changed.tax_rate, changed.tax_regime, changed.special_code] {
                out.push(ReportEntry::plain(ReportCell::Bool(flag)));
            }

            out.push(match &row.matched_reference {
                Some(p) => ReportEntry::text(p),
                None => ReportEntry::plain(ReportCell::Empty),
            });
            out.push(match row.match_score {
                Some(s) => ReportEntry::plain(ReportCell::Number(f64::from(s))),
                None => ReportEntry::plain(ReportCell::Empty),
            });
            out
        })
        .collect();

    ReportTable { headers, rows }
}
