use std::collections::HashSet;

use serde_json_bytes::ByteString;

use crate::cache::CacheReference;
use crate::json_ext::Path;
use crate::spec::Field;

/// Per-object execution context, built up while the executor walks one
/// object's collected fields and handed to the accumulator when the object
/// is finished.
#[derive(Debug, Clone)]
pub struct ObjectExecutionInfo {
    /// The concrete runtime type of the object, when the source knows it;
    /// the statically declared type otherwise.
    pub type_name: String,
    /// Response path from the execution root to this object.
    pub response_path: Path,
    /// The reference this object's record is stored under: its computed
    /// cache key if one was resolved, or the path-derived fallback.
    pub cache_reference: CacheReference,
    /// Names/labels of fragments proven complete at this node.
    pub fulfilled: HashSet<String>,
    /// Labels of deferred fragments whose data has not arrived yet.
    pub deferred: HashSet<String>,
}

/// Per-field execution context. Holds a parent link to the owning object's
/// info rather than owning it.
#[derive(Debug)]
pub struct FieldExecutionInfo<'a> {
    pub field: &'a Field,
    pub parent: &'a ObjectExecutionInfo,
    /// Response path including this field's response key (and, during list
    /// completion, the indices walked so far).
    pub response_path: Path,
    /// The cache path of this field's stored value.
    pub cache_path: CacheReference,
}

impl FieldExecutionInfo<'_> {
    /// The key this field's value occupies in the response object.
    pub fn response_key(&self) -> &ByteString {
        self.field.response_key()
    }

    /// The key this field's value is stored under in a cache record.
    pub fn storage_key(&self) -> &ByteString {
        self.field.storage_key()
    }
}
