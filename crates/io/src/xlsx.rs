// Excel file support: read worksheets via calamine, write reports via rust_xlsxwriter

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet};

use crate::error::IoError;
use crate::report::{ReportCell, ReportTable};
use crate::table::RawTable;

/// Summary of a report export
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub rows_exported: usize,
    pub cells_highlighted: usize,
}

impl ExportResult {
    pub fn summary(&self) -> String {
        format!(
            "{} row{}, {} changed cell{}",
            self.rows_exported,
            if self.rows_exported == 1 { "" } else { "s" },
            self.cells_highlighted,
            if self.cells_highlighted == 1 { "" } else { "s" },
        )
    }
}

/// Read one worksheet (xlsx, xls, xlsb, ods) as a raw table. The first sheet
/// is used unless `sheet` names another.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::Xlsx(format!("cannot open {}: {e}", path.display())))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(wanted) => sheet_names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound(wanted.to_string()))?,
        None => sheet_names.first().cloned().ok_or(IoError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IoError::Xlsx(format!("cannot read sheet '{name}': {e}")))?;

    let records: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    log::debug!("read {} rows from sheet '{}' of {}", records.len(), name, path.display());
    RawTable::from_records(records, &path.display().to_string())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Write the report to a single-sheet workbook. Header row is bold, frozen
/// and autofiltered; overwritten cells get a yellow fill.
pub fn export_report(report: &ReportTable, path: &Path) -> Result<ExportResult, IoError> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook
        .add_worksheet()
        .set_name("Audit")
        .map_err(|e| IoError::Xlsx(format!("cannot create sheet: {e}")))?;

    let mut result = ExportResult::default();
    write_report(worksheet, report, &mut result)?;

    workbook
        .save(path)
        .map_err(|e| IoError::Xlsx(format!("cannot save {}: {e}", path.display())))?;

    log::info!("exported {} to {}", result.summary(), path.display());
    Ok(result)
}

fn write_report(worksheet: &mut Worksheet, report: &ReportTable, result: &mut ExportResult) -> Result<(), IoError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| IoError::Xlsx(e.to_string());

    let header_format = Format::new().set_bold();
    let changed_format = Format::new().set_background_color(Color::Yellow);

    for (col, header) in report.headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .map_err(xlsx_err)?;
    }

    for (i, row) in report.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, entry) in row.iter().enumerate() {
            let c = col as u16;
            match (&entry.value, entry.highlight) {
                (ReportCell::Text(s), true) => {
                    worksheet.write_string_with_format(r, c, s, &changed_format).map_err(xlsx_err)?;
                    result.cells_highlighted += 1;
                }
                (ReportCell::Text(s), false) => {
                    worksheet.write_string(r, c, s).map_err(xlsx_err)?;
                }
                (ReportCell::Bool(b), _) => {
                    worksheet.write_boolean(r, c, *b).map_err(xlsx_err)?;
                }
                (ReportCell::Number(n), _) => {
                    worksheet.write_number(r, c, *n).map_err(xlsx_err)?;
                }
                (ReportCell::Empty, _) => {}
            }
        }
        result.rows_exported += 1;
    }

    worksheet.set_freeze_panes(1, 0).map_err(xlsx_err)?;
    if !report.headers.is_empty() {
        let last_col = (report.headers.len() - 1) as u16;
        worksheet
            .autofilter(0, 0, report.rows.len() as u32, last_col)
            .map_err(xlsx_err)?;
    }

    Ok(())
}
