use std::collections::HashMap;

use crate::model::ReferenceRecord;

/// Curated mapping from reference description to approved tax fields.
///
/// Keys are trimmed descriptions compared exactly. Iteration follows first
/// insertion order; overwriting a key keeps its position, which is what the
/// matcher's tie-breaking relies on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceStore {
    entries: Vec<(String, ReferenceRecord)>,
    /// Trimmed description -> position in `entries`
    index: HashMap<String, usize>,
}

/// Whether an upsert created or replaced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Added,
    Updated,
    /// Blank description; nothing stored.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    pub added: usize,
    pub updated: usize,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up by exact (trimmed) description
    pub fn get(&self, description: &str) -> Option<&ReferenceRecord> {
        self.index
            .get(description.trim())
            .map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, description: &str) -> bool {
        self.index.contains_key(description.trim())
    }

    /// Insert or overwrite by exact description key
    pub fn upsert(&mut self, description: &str, record: ReferenceRecord) -> Upsert {
        let key = description.trim();
        if key.is_empty() {
            return Upsert::Ignored;
        }

        if let Some(&i) = self.index.get(key) {
            self.entries[i].1 = record;
            Upsert::Updated
        } else {
            self.index.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), record));
            Upsert::Added
        }
    }

    /// Upsert every row, counting new versus previously known descriptions.
    ///
    /// A description repeated within `rows` counts as added once and updated
    /// afterwards; the last occurrence wins.
    pub fn merge<I, S>(&mut self, rows: I) -> MergeCounts
    where
        I: IntoIterator<Item = (S, ReferenceRecord)>,
        S: AsRef<str>,
    {
        let mut counts = MergeCounts::default();
        for (description, record) in rows {
            match self.upsert(description.as_ref(), record) {
                Upsert::Added => counts.added += 1,
                Upsert::Updated => counts.updated += 1,
                Upsert::Ignored => {}
            }
        }
        counts
    }

    /// Entries in store order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReferenceRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    /// Case-insensitive substring search over the description and every
    /// field. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<(&str, &ReferenceRecord)> {
        let needle = term.trim().to_lowercase();
        self.iter()
            .filter(|(description, record)| {
                needle.is_empty()
                    || [
                        *description,
                        record.tax_code.as_str(),
                        record.tax_rate.as_str(),
                        record.tax_regime.as_str(),
                        record.special_code.as_str(),
                    ]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect()
    }
}

impl<S: AsRef<str>> FromIterator<(S, ReferenceRecord)> for ReferenceStore {
    fn from_iter<T: IntoIterator<Item = (S, ReferenceRecord)>>(iter: T) -> Self {
        let mut store = Self::new();
        store.merge(iter);
        store
    }
}
