// Reference store persistence and delimited table import/export

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use taxaudit_recon::{normalize_special_code, ReferenceRecord, ReferenceStore};

use crate::columns::{resolve_header, Field};
use crate::error::{IoError, LoadWarning};
use crate::report::ReportTable;
use crate::table::RawTable;
use crate::STORE_HEADER;

// A description heading alone could be a product named "Produto"
fn is_store_header(record: &csv::StringRecord) -> bool {
    record.get(0).and_then(resolve_header) == Some(Field::Description)
        && record.get(1).and_then(resolve_header) == Some(Field::TaxCode)
}

/// Parse a persisted reference store.
///
/// Rows need at least four fields (description, code, rate, regime); a fifth
/// is the special code and defaults to `"0"` when absent. Short or
/// unparseable rows are skipped with a warning. A leading header row is
/// recognized and skipped, so headerless legacy files load too.
pub fn parse_reference_store(content: &str) -> (ReferenceStore, Vec<LoadWarning>) {
    let delimiter = sniff_delimiter(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut store = ReferenceStore::new();
    let mut warnings = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record_no = i + 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("reference row {record_no}: {e}");
                warnings.push(LoadWarning::MalformedRow {
                    record: record_no,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if i == 0 && is_store_header(&record) {
            continue;
        }

        if record.len() < 4 {
            log::warn!("reference row {record_no}: expected at least 4 fields, found {}", record.len());
            warnings.push(LoadWarning::MalformedRow {
                record: record_no,
                reason: format!("expected at least 4 fields, found {}", record.len()),
            });
            continue;
        }

        let field = |n: usize| record.get(n).unwrap_or("");
        store.upsert(
            field(0),
            ReferenceRecord::new(field(1), field(2), field(3), record.get(4)),
        );
    }

    (store, warnings)
}

/// Read and parse a persisted reference store from disk.
pub fn read_reference_store(path: &Path) -> Result<(ReferenceStore, Vec<LoadWarning>), IoError> {
    let content = read_file_as_utf8(path)?;
    Ok(parse_reference_store(&content))
}

/// Replace the persisted store with the full contents of `store`.
///
/// The rows go to a temporary file next to `path`, which is then renamed
/// over it; on failure the previous file is left as it was.
pub fn write_reference_store(store: &ReferenceStore, path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp = temp_path(path);
    let result = write_store_records(store, &tmp).and_then(|()| {
        fs::rename(&tmp, path).map_err(|e| IoError::Io(format!("cannot replace {}: {e}", path.display())))
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    } else {
        log::info!("saved {} references to {}", store.len(), path.display());
    }
    result
}

fn write_store_records(store: &ReferenceStore, path: &Path) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(STORE_HEADER)?;

    for (description, record) in store.iter() {
        let special = normalize_special_code(Some(&record.special_code));
        writer.write_record([
            description,
            record.tax_code.as_str(),
            record.tax_rate.as_str(),
            record.tax_regime.as_str(),
            special.as_str(),
        ])?;
    }

    let file = writer
        .into_inner()
        .map_err(|e| IoError::Io(e.to_string()))?;
    file.sync_all()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reference.csv".into());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Read a delimited file as a raw table (delimiter sniffed).
pub fn read_table(path: &Path) -> Result<RawTable, IoError> {
    let content = read_file_as_utf8(path)?;
    parse_table(&content, &path.display().to_string())
}

pub fn parse_table(content: &str, source: &str) -> Result<RawTable, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(content))
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(|f| f.to_string()).collect());
    }

    RawTable::from_records(records, source)
}

/// Write a report as plain CSV (no highlighting).
pub fn export_report(report: &ReportTable, path: &Path) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;
    writer.write_record(&report.headers)?;

    for row in &report.rows {
        let record: Vec<String> = row.iter().map(|c| c.value.to_text()).collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins. Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the first line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = fs::File::open(path)
        .map_err(|e| IoError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
