use futures::future::BoxFuture;

use crate::cache::CacheReference;
use crate::cache::Record;
use crate::cache::RecordValue;
use crate::cache::TransactionHandle;
use crate::error::ExecutionError;
use crate::execution::ExecutionSource;
use crate::execution::FieldExecutionInfo;
use crate::execution::ResolvedValue;
use crate::json_ext::Path;
use crate::json_ext::PathElement;
use crate::spec::TYPENAME;

/// Resolves fields against normalized cache records.
///
/// Stored references are followed through a read transaction the source
/// holds only weakly: if the transaction has ended by the time a resolution
/// is forced, the field fails with a transaction-scope error instead of
/// reading freed state.
pub struct CacheExecutionSource {
    transaction: TransactionHandle,
}

impl CacheExecutionSource {
    pub fn new(transaction: TransactionHandle) -> Self {
        Self { transaction }
    }

    async fn load(
        &self,
        reference: &CacheReference,
        path: &Path,
    ) -> Result<Record, ExecutionError> {
        let record = self
            .transaction
            .load_record(reference.as_str())
            .await
            .map_err(|_| ExecutionError::NotWithinReadTransaction { path: path.clone() })?;
        record.ok_or_else(|| ExecutionError::DanglingReference {
            reference: reference.clone(),
            path: path.clone(),
        })
    }

    /// Resolve one stored value. List elements are resolved independently;
    /// a failing element is tagged with its index appended to the response
    /// path and the successes are re-assembled around it.
    fn resolve_value<'a>(
        &'a self,
        value: &'a RecordValue,
        path: Path,
    ) -> BoxFuture<'a, Result<ResolvedValue<Record>, ExecutionError>> {
        Box::pin(async move {
            match value {
                RecordValue::Null => Ok(ResolvedValue::Null),
                RecordValue::Scalar(scalar) => Ok(ResolvedValue::Scalar(scalar.clone())),
                RecordValue::Reference(reference) => {
                    Ok(ResolvedValue::Object(self.load(reference, &path).await?))
                }
                RecordValue::List(items) => {
                    let mut resolved = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        let element_path = path.join(PathElement::Index(index));
                        resolved.push(self.resolve_value(item, element_path).await);
                    }
                    Ok(ResolvedValue::List(resolved))
                }
            }
        })
    }
}

impl ExecutionSource for CacheExecutionSource {
    type RawObject = Record;

    fn resolve_field<'a>(
        &'a self,
        info: &'a FieldExecutionInfo<'a>,
        object: &'a Self::RawObject,
    ) -> BoxFuture<'a, Result<Option<ResolvedValue<Self::RawObject>>, ExecutionError>> {
        Box::pin(async move {
            // Records store values under the field's storage key: aliases of
            // one field share one stored value.
            match object.get(info.storage_key().as_str()) {
                None => Ok(None),
                Some(value) => Ok(Some(
                    self.resolve_value(value, info.response_path.clone()).await?,
                )),
            }
        })
    }

    fn type_name(&self, object: &Self::RawObject) -> Option<String> {
        match object.get(TYPENAME) {
            Some(RecordValue::Scalar(value)) => value.as_str().map(|s| s.to_owned()),
            _ => None,
        }
    }

    fn compute_cache_key(
        &self,
        object: &Self::RawObject,
        _type_name: &str,
    ) -> Option<CacheReference> {
        Some(object.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use crate::cache::InMemoryNormalizedCache;
    use crate::cache::NormalizedCache;
    use crate::cache::ReadTransaction;
    use crate::cache::RecordSet;
    use crate::execution::DataDictMapper;
    use crate::execution::GraphQLExecutor;
    use crate::json_ext::Path;
    use crate::spec::Field;
    use crate::spec::FieldType;
    use crate::spec::Fragments;
    use crate::spec::Operation;
    use crate::spec::OperationKind;
    use crate::spec::Schema;
    use crate::spec::Selection;

    use super::*;

    fn friends_record() -> Record {
        let mut record = Record::new("Droid:2001");
        record.insert(
            "friends",
            RecordValue::List(vec![
                RecordValue::Reference("Human:1000".into()),
                RecordValue::Reference("Human:1002".into()),
                RecordValue::Reference("Human:1003".into()),
            ]),
        );
        record
    }

    async fn cache_with_friends(present: &[&str]) -> Arc<InMemoryNormalizedCache> {
        let cache = Arc::new(InMemoryNormalizedCache::new());
        let mut records = RecordSet::new();
        records.insert(friends_record());
        for key in present {
            let mut record = Record::new(*key);
            record.insert("name", RecordValue::Scalar("someone".into()));
            records.insert(record);
        }
        cache.publish(records).await;
        cache
    }

    #[tokio::test]
    async fn reference_fan_out_tags_the_failing_index() {
        let cache = cache_with_friends(&["Human:1000", "Human:1003"]).await;
        let transaction = ReadTransaction::begin(cache);
        let source = CacheExecutionSource::new(transaction.handle());

        let record = friends_record();
        let value = record.get("friends").unwrap();
        let resolved = source
            .resolve_value(value, Path::from("friends"))
            .await
            .unwrap();

        let ResolvedValue::List(elements) = resolved else {
            panic!("expected a list");
        };
        assert_eq!(elements.len(), 3);
        assert!(elements[0].is_ok());
        assert!(elements[2].is_ok());
        match &elements[1] {
            Err(ExecutionError::DanglingReference { reference, path }) => {
                assert_eq!(reference.as_str(), "Human:1002");
                assert_eq!(*path, Path::from("friends/1"));
            }
            other => panic!("expected a dangling reference error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_typed_result_materializes_from_published_records() {
        let cache = Arc::new(InMemoryNormalizedCache::new());
        let mut records = RecordSet::new();
        let mut root = Record::new("QUERY_ROOT");
        root.insert("hero", RecordValue::Reference("Droid:2001".into()));
        records.insert(root);
        let mut droid = Record::new("Droid:2001");
        droid.insert("__typename", RecordValue::Scalar("Droid".into()));
        droid.insert("name", RecordValue::Scalar("R2-D2".into()));
        droid.insert(
            "friends",
            RecordValue::List(vec![RecordValue::Reference("Human:1000".into())]),
        );
        records.insert(droid);
        let mut human = Record::new("Human:1000");
        human.insert("name", RecordValue::Scalar("Luke Skywalker".into()));
        records.insert(human);
        cache.publish(records).await;

        let transaction = ReadTransaction::begin(cache);
        let source = CacheExecutionSource::new(transaction.handle());
        let schema = Arc::new(Schema::default());
        let executor = GraphQLExecutor::new(source, schema, Fragments::default());

        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("hero", FieldType::named("Droid")).with_selections(vec![
                    Selection::field(Field::new("name", FieldType::String)),
                    Selection::field(
                        Field::new("friends", FieldType::list(FieldType::named("Human")))
                            .with_selections(vec![Selection::field(Field::new(
                                "name",
                                FieldType::String,
                            ))]),
                    ),
                ]),
            )],
        );

        let root = transaction
            .handle()
            .load_record("QUERY_ROOT")
            .await
            .unwrap()
            .unwrap();
        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(
            outcome.result.unwrap().to_json(),
            json!({ "hero": {
                "name": "R2-D2",
                "friends": [{ "name": "Luke Skywalker" }],
            }})
        );
    }

    #[tokio::test]
    async fn resolution_outside_a_transaction_fails() {
        let cache = cache_with_friends(&["Human:1000"]).await;
        let transaction = ReadTransaction::begin(cache);
        let source = CacheExecutionSource::new(transaction.handle());
        drop(transaction);

        let record = friends_record();
        let value = record.get("friends").unwrap();
        let resolved = source
            .resolve_value(value, Path::from("friends"))
            .await
            .unwrap();
        let ResolvedValue::List(elements) = resolved else {
            panic!("expected a list");
        };
        for (index, element) in elements.iter().enumerate() {
            match element {
                Err(ExecutionError::NotWithinReadTransaction { path }) => {
                    assert_eq!(*path, Path::from(format!("friends/{index}")));
                }
                other => panic!("expected a transaction-scope error, got {other:?}"),
            }
        }
    }
}
