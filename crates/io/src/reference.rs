//! Reference store lifecycle: load with seed fallback, import, save.

use std::path::Path;

use taxaudit_recon::{AuditRow, MergeCounts, ReferenceStore};

use crate::error::{IoError, LoadWarning};
use crate::table::{audit_rows, read_table, reference_rows};

/// Where the loaded store came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Seeded,
    Empty,
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub store: ReferenceStore,
    pub source: LoadSource,
    pub warnings: Vec<LoadWarning>,
}

impl LoadOutcome {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The persisted file exists but could not be read
    pub fn read_error(&self) -> Option<&IoError> {
        self.warnings.iter().find_map(|w| match w {
            LoadWarning::ReadFailed(e) => Some(e),
            _ => None,
        })
    }
}

/// Load the persisted store, falling back to the seed spreadsheet when the
/// persisted file is absent, unreadable, or holds no records.
///
/// A seed import that succeeds is saved right away, unless the persisted
/// file exists but could not be read: that file is never overwritten.
/// Nothing here fails: problems are returned as warnings and the store
/// degrades to what could be read (possibly empty).
pub fn load(path: &Path, seed: Option<&Path>) -> LoadOutcome {
    load_with(path, seed, crate::csv::read_reference_store)
}

fn load_with<F>(path: &Path, seed: Option<&Path>, read_store: F) -> LoadOutcome
where
    F: Fn(&Path) -> Result<(ReferenceStore, Vec<LoadWarning>), IoError>,
{
    let mut warnings = Vec::new();
    let mut unreadable = false;

    if path.exists() {
        match read_store(path) {
            Ok((store, row_warnings)) => {
                warnings.extend(row_warnings);
                if !store.is_empty() {
                    log::info!("loaded {} references from {}", store.len(), path.display());
                    return LoadOutcome {
                        store,
                        source: LoadSource::Persisted,
                        warnings,
                    };
                }
                log::warn!("{} holds no references", path.display());
            }
            Err(e) => {
                log::warn!("cannot read {}: {e}", path.display());
                warnings.push(LoadWarning::ReadFailed(e));
                unreadable = true;
            }
        }
    }

    let Some(seed) = seed else {
        return LoadOutcome {
            store: ReferenceStore::new(),
            source: LoadSource::Empty,
            warnings,
        };
    };

    log::warn!("seeding reference store from {}", seed.display());
    let mut store = ReferenceStore::new();
    match import_reference(&mut store, seed, None) {
        Ok(counts) if counts.added > 0 => {
            if unreadable {
                log::warn!("not saving seeded store over unreadable {}", path.display());
            } else if let Err(e) = save(&store, path) {
                log::warn!("cannot persist seeded store: {e}");
                warnings.push(LoadWarning::SaveFailed(e));
            }
            LoadOutcome {
                store,
                source: LoadSource::Seeded,
                warnings,
            }
        }
        Ok(_) => LoadOutcome {
            store,
            source: LoadSource::Empty,
            warnings,
        },
        Err(e) => {
            log::warn!("seed import failed: {e}");
            warnings.push(LoadWarning::SeedFailed(e));
            LoadOutcome {
                store: ReferenceStore::new(),
                source: LoadSource::Empty,
                warnings,
            }
        }
    }
}

pub fn save(store: &ReferenceStore, path: &Path) -> Result<(), IoError> {
    crate::csv::write_reference_store(store, path)
}

/// Merge a reference spreadsheet (or CSV) into `store`. On error the store
/// is left untouched.
pub fn import_reference(store: &mut ReferenceStore, path: &Path, sheet: Option<&str>) -> Result<MergeCounts, IoError> {
    let source = path.display().to_string();
    let table = read_table(path, sheet)?;
    let rows = reference_rows(&table, &source)?;
    let counts = store.merge(rows);
    log::info!(
        "imported {source}: {} added, {} updated",
        counts.added,
        counts.updated
    );
    Ok(counts)
}

/// Read the rows of a spreadsheet under audit.
pub fn read_audit_rows(path: &Path, sheet: Option<&str>) -> Result<Vec<AuditRow>, IoError> {
    let source = path.display().to_string();
    let table = read_table(path, sheet)?;
    audit_rows(&table, &source)
}
