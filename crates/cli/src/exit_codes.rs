//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                        |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 2    | CLI usage error (bad args, conflicting options)    |
//! | 3    | I/O failure (file missing, unreadable, unwritable) |
//! | 4    | Input table unusable (missing column, no header)   |
//! | 5    | Settings file unreadable or invalid                |
//! | 6    | `audit --strict` left rows unmatched               |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use taxaudit_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read, written, or replaced.
pub const EXIT_IO: u8 = 3;

/// Input table is missing a required column or has no header row.
pub const EXIT_PARSE: u8 = 4;

/// Settings file could not be read or failed validation.
pub const EXIT_CONFIG: u8 = 5;

/// Audit finished but some rows had no reference match (only with --strict).
pub const EXIT_UNMATCHED: u8 = 6;

/// Map an I/O-layer error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Io(_) | IoError::Xlsx(_) => EXIT_IO,
        IoError::Csv(_)
        | IoError::NoSheets
        | IoError::SheetNotFound(_)
        | IoError::EmptyTable(_)
        | IoError::MissingColumn { .. } => EXIT_PARSE,
    }
}
