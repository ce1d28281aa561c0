//! The normalized object cache: keyed records linked by reference.
//!
//! Responses are flattened into [`Record`]s, one per identifiable object,
//! whose fields hold scalars, lists or [`CacheReference`] links to other
//! records. A [`RecordSet`] is a batch of records produced by one execution;
//! merging it into a store reports exactly the `(key, field)` pairs whose
//! value changed, which is the invalidation signal watch logic keys off.

mod record;
mod record_set;
mod storage;

pub use record::CacheReference;
pub use record::Record;
pub use record::RecordValue;
pub use record_set::ChangedKeys;
pub use record_set::RecordSet;
pub use storage::InMemoryNormalizedCache;
pub use storage::NormalizedCache;
pub use storage::ReadTransaction;
pub use storage::TransactionHandle;
