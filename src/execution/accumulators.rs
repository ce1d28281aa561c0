use std::collections::HashSet;

use serde_json_bytes::ByteString;
use serde_json_bytes::Value;

use crate::cache::CacheReference;
use crate::cache::Record;
use crate::cache::RecordSet;
use crate::cache::RecordValue;
use crate::error::ExecutionError;
use crate::execution::FieldExecutionInfo;
use crate::execution::ObjectExecutionInfo;
use crate::execution::ResultAccumulator;
use crate::execution::data_dict::DataDict;
use crate::execution::data_dict::DataValue;

/// A field value produced by [`DataDictMapper`]: either a concrete value
/// or a marker for a field the source had no entry for.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedValue {
    Value(DataValue),
    /// Absent under a permissive missing-value policy. Suppressed from the
    /// finished object; rendered as `Null` inside lists, where positions
    /// cannot be elided.
    Missing,
}

/// Reduces a traversal into a [`DataDict`]: the typed response object with
/// its fulfilled and deferred fragment bookkeeping.
#[derive(Debug, Default)]
pub struct DataDictMapper;

impl ResultAccumulator for DataDictMapper {
    type FieldValue = MappedValue;
    type FieldEntry = (ByteString, DataValue);
    type ObjectResult = DataDict;

    fn accept_scalar(
        &self,
        value: Value,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(MappedValue::Value(DataValue::Scalar(value)))
    }

    fn accept_custom_scalar(
        &self,
        value: Value,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(MappedValue::Value(DataValue::Scalar(value)))
    }

    fn accept_null(
        &self,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(MappedValue::Value(DataValue::Null))
    }

    fn accept_missing(
        &self,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(MappedValue::Missing)
    }

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        let items = items
            .into_iter()
            .map(|item| match item {
                MappedValue::Value(value) => value,
                MappedValue::Missing => DataValue::Null,
            })
            .collect();
        Ok(MappedValue::Value(DataValue::List(items)))
    }

    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(MappedValue::Value(DataValue::Object(object)))
    }

    fn accept_field_entry(
        &self,
        value: Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError> {
        match value {
            MappedValue::Value(value) => Ok(Some((info.response_key().clone(), value))),
            MappedValue::Missing => Ok(None),
        }
    }

    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError> {
        Ok(DataDict::new(
            entries.into_iter().collect(),
            info.fulfilled.clone(),
            info.deferred.clone(),
        ))
    }
}

/// Reduces a traversal into a [`RecordSet`] of normalized cache records.
///
/// Each finished object becomes one [`Record`] under the object's cache
/// reference; composite field values are stored as references to the child
/// records. The accumulator is pure: child record sets flow upward through
/// the field values and are unioned when an object finishes, so no shared
/// mutable state is needed and the final set can be published outside any
/// lock.
#[derive(Debug, Default)]
pub struct ResultNormalizer;

impl ResultAccumulator for ResultNormalizer {
    type FieldValue = (RecordValue, RecordSet);
    type FieldEntry = (String, RecordValue, RecordSet);
    type ObjectResult = (CacheReference, RecordSet);

    fn requires_cache_key_computation(&self) -> bool {
        true
    }

    fn accept_scalar(
        &self,
        value: Value,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((RecordValue::Scalar(value), RecordSet::new()))
    }

    fn accept_custom_scalar(
        &self,
        value: Value,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((RecordValue::Scalar(value), RecordSet::new()))
    }

    fn accept_null(
        &self,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((RecordValue::Null, RecordSet::new()))
    }

    fn accept_missing(
        &self,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((RecordValue::Null, RecordSet::new()))
    }

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        let mut records = RecordSet::new();
        let mut values = Vec::with_capacity(items.len());
        for (value, item_records) in items {
            values.push(value);
            records.merge(item_records);
        }
        Ok((RecordValue::List(values), records))
    }

    fn accept_child_object(
        &self,
        (reference, records): Self::ObjectResult,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((RecordValue::Reference(reference), records))
    }

    fn accept_field_entry(
        &self,
        (value, records): Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError> {
        // Aliases collapse onto the schema name so both spellings of a
        // field share one stored value.
        Ok(Some((
            info.storage_key().as_str().to_owned(),
            value,
            records,
        )))
    }

    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError> {
        let mut records = RecordSet::new();
        let mut record = Record::new(info.cache_reference.clone());
        for (key, value, child_records) in entries {
            record.insert(key, value);
            records.merge(child_records);
        }
        records.insert(record);
        Ok((info.cache_reference.clone(), records))
    }
}

/// Collects the set of cache paths a result was read from, one entry per
/// field visited. Watching these keys for changes tells a caller when the
/// result is stale.
#[derive(Debug, Default)]
pub struct DependencyTracker;

impl ResultAccumulator for DependencyTracker {
    type FieldValue = HashSet<String>;
    type FieldEntry = HashSet<String>;
    type ObjectResult = HashSet<String>;

    fn accept_scalar(
        &self,
        _value: Value,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(HashSet::new())
    }

    fn accept_custom_scalar(
        &self,
        _value: Value,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(HashSet::new())
    }

    fn accept_null(
        &self,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(HashSet::new())
    }

    fn accept_missing(
        &self,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(HashSet::new())
    }

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(items.into_iter().flatten().collect())
    }

    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        _info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok(object)
    }

    fn accept_field_entry(
        &self,
        mut value: Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError> {
        value.insert(info.cache_path.as_str().to_owned());
        Ok(Some(value))
    }

    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        _info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError> {
        Ok(entries.into_iter().flatten().collect())
    }
}
