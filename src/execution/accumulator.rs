use serde_json_bytes::Value;

use crate::error::ExecutionError;
use crate::execution::FieldExecutionInfo;
use crate::execution::ObjectExecutionInfo;

/// A reduction strategy invoked bottom-up by the executor as it finishes
/// each node of the traversal.
///
/// Accumulators are pure with respect to the traversal: every callback
/// receives the execution info for its node and returns a value that flows
/// upward, so composing accumulators (see [`Zip2`] / [`Zip3`]) is a plain
/// product over the callbacks.
pub trait ResultAccumulator: Send + Sync {
    /// The reduction of one field value.
    type FieldValue: Send;
    /// The reduction of one `(key, value)` field entry.
    type FieldEntry: Send;
    /// The reduction of one finished object.
    type ObjectResult: Send;

    /// Whether the executor should bother computing cache keys for the
    /// objects it traverses. Skipped for network-only execution.
    fn requires_cache_key_computation(&self) -> bool {
        false
    }

    /// A scalar whose wire shape was validated against the field type.
    fn accept_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError>;

    /// A scalar of a custom type this crate cannot validate; passed through.
    fn accept_custom_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError>;

    /// An explicit null.
    fn accept_null(&self, info: &FieldExecutionInfo<'_>)
        -> Result<Self::FieldValue, ExecutionError>;

    /// A value the source had no entry for, permitted by the executor's
    /// missing-value policy. Implementations typically produce a marker
    /// that [`Self::accept_field_entry`] later suppresses.
    fn accept_missing(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError>;

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError>;

    /// A finished child object, already reduced by this accumulator.
    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError>;

    /// Produce the entry for one field, or `None` to omit the field from
    /// the finished object entirely.
    fn accept_field_entry(
        &self,
        value: Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError>;

    /// Finalize an object from its field entries and the fulfilled/deferred
    /// fragment sets collected for the node.
    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError>;
}

/// The product of two accumulators: one traversal, two outputs.
///
/// A field entry survives only if neither member suppresses it; members of
/// a zip see the same values, so they agree on suppression in practice.
pub struct Zip2<A, B>(pub A, pub B);

impl<A, B> ResultAccumulator for Zip2<A, B>
where
    A: ResultAccumulator,
    B: ResultAccumulator,
{
    type FieldValue = (A::FieldValue, B::FieldValue);
    type FieldEntry = (A::FieldEntry, B::FieldEntry);
    type ObjectResult = (A::ObjectResult, B::ObjectResult);

    fn requires_cache_key_computation(&self) -> bool {
        self.0.requires_cache_key_computation() || self.1.requires_cache_key_computation()
    }

    fn accept_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((
            self.0.accept_scalar(value.clone(), info)?,
            self.1.accept_scalar(value, info)?,
        ))
    }

    fn accept_custom_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((
            self.0.accept_custom_scalar(value.clone(), info)?,
            self.1.accept_custom_scalar(value, info)?,
        ))
    }

    fn accept_null(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((self.0.accept_null(info)?, self.1.accept_null(info)?))
    }

    fn accept_missing(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((self.0.accept_missing(info)?, self.1.accept_missing(info)?))
    }

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        let (left, right): (Vec<_>, Vec<_>) = items.into_iter().unzip();
        Ok((
            self.0.accept_list(left, info)?,
            self.1.accept_list(right, info)?,
        ))
    }

    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        Ok((
            self.0.accept_child_object(object.0, info)?,
            self.1.accept_child_object(object.1, info)?,
        ))
    }

    fn accept_field_entry(
        &self,
        value: Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError> {
        match (
            self.0.accept_field_entry(value.0, info)?,
            self.1.accept_field_entry(value.1, info)?,
        ) {
            (Some(left), Some(right)) => Ok(Some((left, right))),
            _ => Ok(None),
        }
    }

    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError> {
        let (left, right): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        Ok((
            self.0.finish_object(left, info)?,
            self.1.finish_object(right, info)?,
        ))
    }
}

/// The product of three accumulators, implemented as a nested [`Zip2`] with
/// flattened tuple results.
pub struct Zip3<A, B, C>(pub A, pub B, pub C);

impl<A, B, C> Zip3<A, B, C>
where
    A: ResultAccumulator,
    B: ResultAccumulator,
    C: ResultAccumulator,
{
    fn inner(&self) -> Zip2<Zip2<&A, &B>, &C> {
        Zip2(Zip2(&self.0, &self.1), &self.2)
    }
}

impl<T: ResultAccumulator> ResultAccumulator for &T {
    type FieldValue = T::FieldValue;
    type FieldEntry = T::FieldEntry;
    type ObjectResult = T::ObjectResult;

    fn requires_cache_key_computation(&self) -> bool {
        (**self).requires_cache_key_computation()
    }

    fn accept_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        (**self).accept_scalar(value, info)
    }

    fn accept_custom_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        (**self).accept_custom_scalar(value, info)
    }

    fn accept_null(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        (**self).accept_null(info)
    }

    fn accept_missing(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        (**self).accept_missing(info)
    }

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        (**self).accept_list(items, info)
    }

    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        (**self).accept_child_object(object, info)
    }

    fn accept_field_entry(
        &self,
        value: Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError> {
        (**self).accept_field_entry(value, info)
    }

    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError> {
        (**self).finish_object(entries, info)
    }
}

impl<A, B, C> ResultAccumulator for Zip3<A, B, C>
where
    A: ResultAccumulator,
    B: ResultAccumulator,
    C: ResultAccumulator,
{
    type FieldValue = ((A::FieldValue, B::FieldValue), C::FieldValue);
    type FieldEntry = ((A::FieldEntry, B::FieldEntry), C::FieldEntry);
    type ObjectResult = ((A::ObjectResult, B::ObjectResult), C::ObjectResult);

    fn requires_cache_key_computation(&self) -> bool {
        self.inner().requires_cache_key_computation()
    }

    fn accept_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        self.inner().accept_scalar(value, info)
    }

    fn accept_custom_scalar(
        &self,
        value: Value,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        self.inner().accept_custom_scalar(value, info)
    }

    fn accept_null(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        self.inner().accept_null(info)
    }

    fn accept_missing(
        &self,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        self.inner().accept_missing(info)
    }

    fn accept_list(
        &self,
        items: Vec<Self::FieldValue>,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        self.inner().accept_list(items, info)
    }

    fn accept_child_object(
        &self,
        object: Self::ObjectResult,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Self::FieldValue, ExecutionError> {
        self.inner().accept_child_object(object, info)
    }

    fn accept_field_entry(
        &self,
        value: Self::FieldValue,
        info: &FieldExecutionInfo<'_>,
    ) -> Result<Option<Self::FieldEntry>, ExecutionError> {
        self.inner().accept_field_entry(value, info)
    }

    fn finish_object(
        &self,
        entries: Vec<Self::FieldEntry>,
        info: &ObjectExecutionInfo,
    ) -> Result<Self::ObjectResult, ExecutionError> {
        self.inner().finish_object(entries, info)
    }
}
