use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::Value;

use crate::json_ext::Path;
use crate::json_ext::PathElement;
use crate::spec::OperationKind;

/// Separator between the components of a derived cache key.
const KEY_SEPARATOR: &str = ".";

/// An opaque key identifying a normalized object in the cache.
///
/// Two responses describing the same logical object always compute the same
/// reference: either the schema-supplied cache key (`Droid:2001`) or, for
/// objects with no identity of their own, the root key joined with the
/// response path that reached them (`QUERY_ROOT.hero.friends.0`).
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheReference(pub String);

impl CacheReference {
    /// The root reference for an operation kind.
    pub fn root_for(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Query => CacheReference("QUERY_ROOT".to_string()),
            OperationKind::Mutation => CacheReference("MUTATION_ROOT".to_string()),
            OperationKind::Subscription => CacheReference("SUBSCRIPTION_ROOT".to_string()),
        }
    }

    /// The reference rooting an incremental item: the operation root key
    /// with the item's path components appended, independent of call order.
    pub fn for_incremental(kind: OperationKind, path: &Path) -> Self {
        let mut key = Self::root_for(kind).0;
        for element in path.iter() {
            key.push_str(KEY_SEPARATOR);
            match element {
                PathElement::Key(k) => key.push_str(k),
                PathElement::Index(i) => key.push_str(&i.to_string()),
            }
        }
        CacheReference(key)
    }

    /// A child reference derived by appending one path component.
    pub fn appending(&self, element: &PathElement) -> Self {
        CacheReference(format!("{}{KEY_SEPARATOR}{element}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for CacheReference {
    fn from(key: String) -> Self {
        CacheReference(key)
    }
}

impl From<&str> for CacheReference {
    fn from(key: &str) -> Self {
        CacheReference(key.to_owned())
    }
}

/// One stored field value: a scalar, an ordered list (whose elements may be
/// scalars, lists or references), or a link to another record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RecordValue {
    Null,
    Scalar(Value),
    List(Vec<RecordValue>),
    Reference(CacheReference),
}

/// The field map of one normalized object, identified by its cache key.
/// Mutated only through [`Record::merge`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub key: CacheReference,
    fields: IndexMap<String, RecordValue>,
}

impl Record {
    pub fn new(key: impl Into<CacheReference>) -> Self {
        Self {
            key: key.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: RecordValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&RecordValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &RecordValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Union `other`'s fields into this record. Last writer wins per field;
    /// the returned list names exactly the fields whose stored value is no
    /// longer structurally equal to what it was before.
    pub(crate) fn merge(&mut self, other: Record) -> Vec<String> {
        let mut changed = Vec::new();
        for (field, value) in other.fields {
            match self.fields.get(&field) {
                Some(existing) if *existing == value => {}
                _ => {
                    changed.push(field.clone());
                    self.fields.insert(field, value);
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_references_are_stable() {
        assert_eq!(
            CacheReference::root_for(OperationKind::Query),
            CacheReference::root_for(OperationKind::Query)
        );
        assert_eq!(
            CacheReference::root_for(OperationKind::Mutation).as_str(),
            "MUTATION_ROOT"
        );
    }

    #[test]
    fn incremental_reference_joins_path_components() {
        let path = Path(vec![
            PathElement::Key("a".to_string()),
            PathElement::Index(1),
            PathElement::Key("b".to_string()),
        ]);
        let reference = CacheReference::for_incremental(OperationKind::Query, &path);
        assert_eq!(reference.as_str(), "QUERY_ROOT.a.1.b");
        // Independent of call order.
        assert_eq!(
            reference,
            CacheReference::for_incremental(OperationKind::Query, &path)
        );
    }

    #[test]
    fn merge_reports_only_real_changes() {
        let mut record = Record::new("Droid:2001");
        record.insert("name", RecordValue::Scalar("R2-D2".into()));
        record.insert("age", RecordValue::Scalar(5.into()));

        let mut same = Record::new("Droid:2001");
        same.insert("name", RecordValue::Scalar("R2-D2".into()));
        assert!(record.merge(same).is_empty());

        let mut different = Record::new("Droid:2001");
        different.insert("name", RecordValue::Scalar("R2-Q5".into()));
        assert_eq!(record.merge(different), vec!["name".to_string()]);
        assert_eq!(
            record.get("name"),
            Some(&RecordValue::Scalar("R2-Q5".into()))
        );
    }
}
