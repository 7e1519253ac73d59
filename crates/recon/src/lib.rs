//! `taxaudit-recon` — Reference-based tax line-item reconciliation engine.
//!
//! Pure engine crate: receives a pre-loaded reference store and audit rows,
//! returns annotated rows. No file I/O.

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod keywords;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod store;

pub use config::MatchPolicy;
pub use engine::{reconcile, run};
pub use error::ReconError;
pub use model::{AuditRow, ChangedFields, MatchMethod, MatchResult, ReconResult, ReferenceRecord};
pub use normalize::normalize_special_code;
pub use store::{MergeCounts, ReferenceStore, Upsert};
