use std::sync::Arc;
use std::sync::Weak;

use futures::Stream;
use futures::StreamExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::cache::ChangedKeys;
use crate::cache::Record;
use crate::cache::RecordSet;

/// The transactional store boundary this crate reads from and writes to.
///
/// Writers are expected to serialize record publication at the store; the
/// merge computation itself is pure (see [`RecordSet::merge`]) so callers
/// may compute a write-set off the store's lock and apply it atomically.
pub trait NormalizedCache: Send + Sync {
    /// Load the record stored under `key`, if any.
    fn load_record<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<Record>>;

    /// Merge a record set into the store, returning the changed keys.
    fn publish(&self, records: RecordSet) -> BoxFuture<'_, ChangedKeys>;
}

/// A tokio-synchronized in-memory [`NormalizedCache`].
///
/// Every publication broadcasts its changed keys, so watchers holding a
/// result's dependent-key set can tell when that result went stale.
pub struct InMemoryNormalizedCache {
    records: RwLock<RecordSet>,
    changes: broadcast::Sender<ChangedKeys>,
}

impl Default for InMemoryNormalizedCache {
    fn default() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            records: RwLock::new(RecordSet::new()),
            changes,
        }
    }
}

/// A slow watcher loses the oldest change notifications, not record data.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

impl InMemoryNormalizedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stream of the changed-key sets of future publications.
    pub fn watch_changes(&self) -> impl Stream<Item = ChangedKeys> {
        BroadcastStream::new(self.changes.subscribe())
            .filter_map(|changed| futures::future::ready(changed.ok()))
    }
}

impl NormalizedCache for InMemoryNormalizedCache {
    fn load_record<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Option<Record>> {
        Box::pin(async move { self.records.read().await.get(key).cloned() })
    }

    fn publish(&self, records: RecordSet) -> BoxFuture<'_, ChangedKeys> {
        Box::pin(async move {
            let changed = self.records.write().await.merge(records);
            if !changed.is_empty() {
                // No receivers is fine; nobody is watching.
                let _ = self.changes.send(changed.clone());
            }
            changed
        })
    }
}

/// The transaction has ended; the cache can no longer be read through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransactionEnded;

struct TransactionInner {
    cache: Arc<dyn NormalizedCache>,
}

/// A read transaction scoped to a single execution call.
///
/// The owning side. Dropping it ends the transaction: any
/// [`TransactionHandle`] still held by an execution source will fail
/// deterministically instead of reading freed state.
pub struct ReadTransaction {
    inner: Arc<TransactionInner>,
}

impl ReadTransaction {
    pub fn begin(cache: Arc<dyn NormalizedCache>) -> Self {
        Self {
            inner: Arc::new(TransactionInner { cache }),
        }
    }

    /// A non-owning handle for an execution source to resolve references
    /// through. It does not keep the transaction alive.
    pub fn handle(&self) -> TransactionHandle {
        TransactionHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

/// Weak reference to a [`ReadTransaction`].
#[derive(Clone)]
pub struct TransactionHandle {
    inner: Weak<TransactionInner>,
}

impl TransactionHandle {
    pub(crate) async fn load_record(&self, key: &str) -> Result<Option<Record>, TransactionEnded> {
        let inner = self.inner.upgrade().ok_or(TransactionEnded)?;
        Ok(inner.cache.load_record(key).await)
    }
}
