use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::cache::Record;

/// The `(cache key, field key)` pairs whose stored value changed during a
/// merge. Upstream watch logic uses this to decide whether to notify
/// observers; a pair whose new value is structurally equal to the old one is
/// never reported.
pub type ChangedKeys = HashSet<(String, String)>;

/// A batch of cache writes: a mapping from cache key to [`Record`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    records: IndexMap<String, Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.key.as_str().to_owned(), record);
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Union `other` into this set: for each incoming record, merge its
    /// fields into any existing record with the same key (last writer wins
    /// per field). Returns the `(key, field)` pairs whose value actually
    /// changed. Pure computation; safe to run off any store lock and apply
    /// atomically afterwards.
    pub fn merge(&mut self, other: RecordSet) -> ChangedKeys {
        let mut changed = ChangedKeys::new();
        for (key, record) in other.records {
            match self.records.get_mut(&key) {
                Some(existing) => {
                    for field in existing.merge(record) {
                        changed.insert((key.clone(), field));
                    }
                }
                None => {
                    for (field, _) in record.fields() {
                        changed.insert((key.clone(), field.clone()));
                    }
                    self.records.insert(key, record);
                }
            }
        }
        changed
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}
