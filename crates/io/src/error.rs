use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    /// File read/write/rename failure.
    Io(String),
    /// Delimited text could not be read or written.
    Csv(String),
    /// Workbook could not be opened, read, or written.
    Xlsx(String),
    /// Workbook has no worksheets.
    NoSheets,
    /// Requested worksheet does not exist.
    SheetNotFound(String),
    /// Table has no header row.
    EmptyTable(String),
    /// Required column absent after alias resolution.
    MissingColumn { source: String, column: String },
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Xlsx(msg) => write!(f, "spreadsheet error: {msg}"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
            Self::SheetNotFound(name) => write!(f, "sheet not found: '{name}'"),
            Self::EmptyTable(source) => write!(f, "'{source}': no header row found"),
            Self::MissingColumn { source, column } => {
                write!(f, "'{source}': missing required column '{column}'")
            }
        }
    }
}

impl std::error::Error for IoError {}

/// Non-fatal problems met while loading the reference store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Persisted row skipped (too few fields or unparseable).
    MalformedRow { record: usize, reason: String },
    /// Persisted store exists but could not be read.
    ReadFailed(IoError),
    /// Seed spreadsheet import failed; store left empty.
    SeedFailed(IoError),
    /// Seed import succeeded but the result could not be persisted.
    SaveFailed(IoError),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRow { record, reason } => {
                write!(f, "skipped reference row {record}: {reason}")
            }
            Self::ReadFailed(e) => write!(f, "cannot read reference store: {e}"),
            Self::SeedFailed(e) => write!(f, "seed import failed: {e}"),
            Self::SaveFailed(e) => write!(f, "cannot persist seeded store: {e}"),
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<::csv::Error> for IoError {
    fn from(e: ::csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}
