//! Generic selection-set execution.
//!
//! The [`GraphQLExecutor`] walks a selection-set tree against an
//! [`ExecutionSource`] (raw network JSON, cache records, or any other
//! representation that can resolve fields) and reduces each node through a
//! [`ResultAccumulator`]. Accumulators can be zipped so a single traversal
//! produces a typed [`DataDict`], a cache write-set and a dependency-key set
//! at once instead of walking the tree three times.

mod accumulator;
mod accumulators;
mod cache_source;
mod data_dict;
mod executor;
mod field_info;
mod source;

pub use accumulator::ResultAccumulator;
pub use accumulator::Zip2;
pub use accumulator::Zip3;
pub use accumulators::DataDictMapper;
pub use accumulators::DependencyTracker;
pub use accumulators::MappedValue;
pub use accumulators::ResultNormalizer;
pub use cache_source::CacheExecutionSource;
pub use data_dict::DataDict;
pub use data_dict::DataValue;
pub use executor::ExecutionOutcome;
pub use executor::GraphQLExecutor;
pub use field_info::FieldExecutionInfo;
pub use field_info::ObjectExecutionInfo;
pub use source::ExecutionSource;
pub use source::JsonExecutionSource;
pub use source::ResolvedValue;

/// What to do when a selected field has no value on the source object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValuePolicy {
    /// Raise a decode error scoped to the field's response path.
    #[default]
    Disallow,
    /// Allow absence for nullable fields only; required fields still raise.
    AllowForOptionalFields,
    /// Allow absence everywhere, producing entries that are suppressed from
    /// the output. Only suitable for test or mock object construction.
    AllowForAllFields,
}
