// File I/O operations

pub mod columns;
pub mod csv;
pub mod error;
pub mod reference;
pub mod report;
pub mod table;
pub mod xlsx;

pub use error::{IoError, LoadWarning};
pub use reference::{LoadOutcome, LoadSource};
pub use table::RawTable;

/// Header row of the persisted reference store.
pub const STORE_HEADER: [&str; 5] = ["description", "tax_code", "tax_rate", "tax_regime", "special_code"];
