use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json_bytes::ByteString;
use serde_json_bytes::Value;

use crate::error::MergeError;
use crate::json_ext::Path;
use crate::json_ext::PathElement;

/// One value of a materialized selection-set result.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Scalar(Value),
    List(Vec<DataValue>),
    Object(DataDict),
}

impl DataValue {
    /// The plain JSON rendering of this value, fragment bookkeeping elided.
    pub fn to_json(&self) -> Value {
        match self {
            DataValue::Null => Value::Null,
            DataValue::Scalar(value) => value.clone(),
            DataValue::List(items) => Value::Array(items.iter().map(DataValue::to_json).collect()),
            DataValue::Object(dict) => dict.to_json(),
        }
    }
}

/// A materialized selection-set result.
///
/// Alongside its field map it tracks two fragment-name sets: `fulfilled`
/// (selections known complete) and `deferred` (labeled selections whose data
/// has not arrived yet). Invariant: the two sets are disjoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDict {
    fields: IndexMap<ByteString, DataValue>,
    fulfilled: HashSet<String>,
    deferred: HashSet<String>,
}

impl DataDict {
    pub fn new(
        fields: IndexMap<ByteString, DataValue>,
        fulfilled: HashSet<String>,
        deferred: HashSet<String>,
    ) -> Self {
        // An incoming payload may still name a fragment it fulfilled in its
        // deferred set; fulfillment dominates, so normalize here.
        let deferred = deferred
            .into_iter()
            .filter(|label| !fulfilled.contains(label))
            .collect();
        Self {
            fields,
            fulfilled,
            deferred,
        }
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&ByteString, &DataValue)> {
        self.fields.iter()
    }

    pub fn fulfilled(&self) -> &HashSet<String> {
        &self.fulfilled
    }

    pub fn deferred(&self) -> &HashSet<String> {
        &self.deferred
    }

    /// Record that the fragment `label` has been delivered. Fulfillment
    /// dominates: the label leaves the deferred set for good.
    pub fn mark_fulfilled(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.deferred.remove(&label);
        self.fulfilled.insert(label);
    }

    /// True once no deferred fragment remains outstanding anywhere below
    /// this node.
    pub fn is_complete(&self) -> bool {
        self.deferred.is_empty()
            && self.fields.values().all(|value| match value {
                DataValue::Object(dict) => dict.is_complete(),
                DataValue::List(items) => items.iter().all(|item| match item {
                    DataValue::Object(dict) => dict.is_complete(),
                    _ => true,
                }),
                _ => true,
            })
    }

    /// The plain JSON rendering of this result.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Merge one selection-set's data into the nested location identified by
    /// `path`, whose components must reference data shaped by the original
    /// execution: an unknown field or out-of-bounds index is an error, not a
    /// no-op. At the terminal node both sides must agree wherever they
    /// overlap; a doubly-defined field with unequal values is a conflict.
    ///
    /// On error nothing is modified.
    pub fn merge_at(&mut self, path: &Path, incoming: DataDict) -> Result<(), MergeError> {
        let target = Self::locate(self, &path.0, Path::empty())?;
        target.merge_fields(incoming, path)
    }

    fn locate<'a>(
        dict: &'a mut DataDict,
        elements: &[PathElement],
        mut walked: Path,
    ) -> Result<&'a mut DataDict, MergeError> {
        match elements.split_first() {
            None => Ok(dict),
            Some((PathElement::Key(key), rest)) => {
                let Some(child) = dict.fields.get_mut(key.as_str()) else {
                    return Err(MergeError::UnknownField {
                        path: walked,
                        key: key.clone(),
                    });
                };
                walked.push(PathElement::Key(key.clone()));
                Self::locate_value(child, rest, walked)
            }
            Some((PathElement::Index(index), _)) => Err(MergeError::InvalidPathShape {
                path: walked.join(PathElement::Index(*index)),
                expected: "a list",
            }),
        }
    }

    fn locate_value<'a>(
        value: &'a mut DataValue,
        elements: &[PathElement],
        mut walked: Path,
    ) -> Result<&'a mut DataDict, MergeError> {
        match elements.split_first() {
            None => match value {
                DataValue::Object(dict) => Ok(dict),
                _ => Err(MergeError::InvalidPathShape {
                    path: walked,
                    expected: "an object",
                }),
            },
            Some((PathElement::Key(key), rest)) => match value {
                DataValue::Object(dict) => {
                    let Some(child) = dict.fields.get_mut(key.as_str()) else {
                        return Err(MergeError::UnknownField {
                            path: walked,
                            key: key.clone(),
                        });
                    };
                    walked.push(PathElement::Key(key.clone()));
                    Self::locate_value(child, rest, walked)
                }
                _ => Err(MergeError::InvalidPathShape {
                    path: walked,
                    expected: "an object",
                }),
            },
            Some((PathElement::Index(index), rest)) => match value {
                DataValue::List(items) => {
                    let Some(item) = items.get_mut(*index) else {
                        return Err(MergeError::IndexOutOfBounds {
                            path: walked,
                            index: *index,
                        });
                    };
                    walked.push(PathElement::Index(*index));
                    Self::locate_value(item, rest, walked)
                }
                _ => Err(MergeError::InvalidPathShape {
                    path: walked,
                    expected: "a list",
                }),
            },
        }
    }

    fn merge_fields(&mut self, incoming: DataDict, path: &Path) -> Result<(), MergeError> {
        // Check every overlap before touching anything so a failed merge
        // leaves the previously merged result untouched.
        for (key, value) in &incoming.fields {
            if let Some(existing) = self.fields.get(key) {
                if existing != value {
                    return Err(MergeError::ConflictingFieldValue {
                        path: path.clone(),
                        key: key.as_str().to_owned(),
                    });
                }
            }
        }

        for (key, value) in incoming.fields {
            self.fields.entry(key).or_insert(value);
        }

        // Newly fulfilled fragments leave the deferred set even if the
        // incoming deferred set still names them: fulfillment dominates.
        self.fulfilled.extend(incoming.fulfilled);
        self.deferred.extend(incoming.deferred);
        let fulfilled = &self.fulfilled;
        self.deferred.retain(|label| !fulfilled.contains(label));
        Ok(())
    }
}
