use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json_bytes::Value;

use crate::cache::CacheReference;
use crate::error::ExecutionError;
use crate::execution::FieldExecutionInfo;
use crate::json_ext::Object;
use crate::spec::SchemaMetadata;
use crate::spec::TYPENAME;

/// A field value after the source has resolved any indirection it stores:
/// references are followed, nested lists are expanded, and composite values
/// are surfaced as the source's own raw-object representation so the
/// executor can recurse into them.
#[derive(Debug)]
pub enum ResolvedValue<R> {
    Null,
    Scalar(Value),
    /// Elements resolve independently; a failing element carries an error
    /// whose path already names its list index, so one bad element does not
    /// poison its siblings.
    List(Vec<Result<ResolvedValue<R>, ExecutionError>>),
    Object(R),
}

/// Adapts one concrete data representation (raw network JSON, cache
/// records, a previously materialized model) to the executor's uniform
/// field-resolution interface.
pub trait ExecutionSource: Send + Sync {
    /// The representation of one composite object in this source.
    type RawObject: Clone + Send + Sync;

    /// Look up the value for the field described by `info` on `object`.
    /// `Ok(None)` means the object carries no value for the field at all,
    /// which is distinct from an explicit null.
    fn resolve_field<'a>(
        &'a self,
        info: &'a FieldExecutionInfo<'a>,
        object: &'a Self::RawObject,
    ) -> BoxFuture<'a, Result<Option<ResolvedValue<Self::RawObject>>, ExecutionError>>;

    /// The concrete runtime type name of `object`, if the representation
    /// records one.
    fn type_name(&self, object: &Self::RawObject) -> Option<String>;

    /// Compute the cache key identifying `object`. Only consulted when the
    /// active accumulator declares it requires cache-key computation;
    /// network-only execution without cache writes skips this.
    fn compute_cache_key(
        &self,
        object: &Self::RawObject,
        type_name: &str,
    ) -> Option<CacheReference>;
}

/// Resolves fields against raw JSON objects from the network.
pub struct JsonExecutionSource {
    schema: Arc<dyn SchemaMetadata>,
}

impl JsonExecutionSource {
    pub fn new(schema: Arc<dyn SchemaMetadata>) -> Self {
        Self { schema }
    }

    fn resolve_value(value: &Value) -> ResolvedValue<Object> {
        match value {
            Value::Null => ResolvedValue::Null,
            Value::Object(object) => ResolvedValue::Object(object.clone()),
            Value::Array(items) => {
                ResolvedValue::List(items.iter().map(|item| Ok(Self::resolve_value(item))).collect())
            }
            scalar => ResolvedValue::Scalar(scalar.clone()),
        }
    }
}

impl ExecutionSource for JsonExecutionSource {
    type RawObject = Object;

    fn resolve_field<'a>(
        &'a self,
        info: &'a FieldExecutionInfo<'a>,
        object: &'a Self::RawObject,
    ) -> BoxFuture<'a, Result<Option<ResolvedValue<Self::RawObject>>, ExecutionError>> {
        // Wire JSON stores values under the response key: aliases are
        // distinct entries.
        let resolved = match object.get(info.response_key().as_str()) {
            Some(value) => Some(Self::resolve_value(value)),
            // Servers may omit `__typename` on root operation types;
            // synthesize it from the type the traversal already resolved.
            None if info.field.name.as_str() == TYPENAME => Some(ResolvedValue::Scalar(
                Value::String(info.parent.type_name.as_str().into()),
            )),
            None => None,
        };
        Box::pin(std::future::ready(Ok(resolved)))
    }

    fn type_name(&self, object: &Self::RawObject) -> Option<String> {
        object
            .get(TYPENAME)
            .and_then(|value| value.as_str())
            .map(|s| s.to_owned())
    }

    fn compute_cache_key(
        &self,
        object: &Self::RawObject,
        type_name: &str,
    ) -> Option<CacheReference> {
        self.schema
            .cache_key(type_name, object)
            .map(CacheReference::from)
    }
}
