use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json_bytes::ByteString;

use crate::cache::CacheReference;
use crate::error::ExecutionError;
use crate::execution::FieldExecutionInfo;
use crate::execution::MissingValuePolicy;
use crate::execution::ObjectExecutionInfo;
use crate::execution::ResultAccumulator;
use crate::execution::source::ExecutionSource;
use crate::execution::source::ResolvedValue;
use crate::graphql;
use crate::json_ext::Path;
use crate::json_ext::PathElement;
use crate::spec::Field;
use crate::spec::FieldType;
use crate::spec::Fragments;
use crate::spec::Operation;
use crate::spec::SchemaMetadata;
use crate::spec::Selection;

/// Marker for a value that failed validation at a non-nullable position.
/// The failure bubbles up until a nullable field absorbs it as `null`; the
/// originating error was already recorded when the marker was created.
struct InvalidValue;

/// The result of executing one operation: the reduced root object if the
/// tree survived null propagation, plus every field-scoped error recorded
/// along the way.
#[derive(Debug)]
pub struct ExecutionOutcome<T> {
    /// `None` when an invalid value propagated all the way to the root.
    pub result: Option<T>,
    pub errors: Vec<graphql::Error>,
}

/// Walks an operation's selection set over an [`ExecutionSource`], reducing
/// every node through a [`ResultAccumulator`].
///
/// Execution never returns early on a field-scoped failure: the error is
/// recorded at the failing path and `null` is produced at the nearest
/// nullable ancestor, matching GraphQL error propagation.
pub struct GraphQLExecutor<S> {
    source: S,
    schema: Arc<dyn SchemaMetadata>,
    fragments: Fragments,
    missing_value_policy: MissingValuePolicy,
}

#[derive(Default)]
struct CollectedFields {
    /// Grouped by response key, in selection order. A key selected twice
    /// keeps one entry with the merged sub-selections.
    fields: IndexMap<ByteString, Field>,
    fulfilled: HashSet<String>,
    deferred: HashSet<String>,
}

fn record<T>(
    result: Result<T, ExecutionError>,
    errors: &mut Vec<graphql::Error>,
) -> Result<T, InvalidValue> {
    result.map_err(|err| {
        errors.push(err.to_graphql_error());
        InvalidValue
    })
}

impl<S: ExecutionSource> GraphQLExecutor<S> {
    pub fn new(source: S, schema: Arc<dyn SchemaMetadata>, fragments: Fragments) -> Self {
        Self {
            source,
            schema,
            fragments,
            missing_value_policy: MissingValuePolicy::default(),
        }
    }

    pub fn with_missing_value_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.missing_value_policy = policy;
        self
    }

    /// Execute `operation` against `root`, reducing through `accumulator`.
    pub async fn execute<A: ResultAccumulator>(
        &self,
        operation: &Operation,
        root: &S::RawObject,
        accumulator: &A,
    ) -> ExecutionOutcome<A::ObjectResult> {
        self.execute_at(
            &operation.selection_set,
            &operation.type_name,
            root,
            Path::empty(),
            CacheReference::root_for(operation.kind),
            accumulator,
        )
        .await
    }

    /// Execute a selection set rooted somewhere other than the operation
    /// root, as when materializing an incremental payload addressed by its
    /// response path.
    pub async fn execute_at<A: ResultAccumulator>(
        &self,
        selections: &[Selection],
        declared_type: &str,
        root: &S::RawObject,
        response_path: Path,
        cache_reference: CacheReference,
        accumulator: &A,
    ) -> ExecutionOutcome<A::ObjectResult> {
        let mut errors = Vec::new();
        let result = self
            .execute_selection_set(
                accumulator,
                selections,
                root,
                declared_type,
                response_path,
                cache_reference,
                &mut errors,
            )
            .await;
        ExecutionOutcome {
            result: result.ok(),
            errors,
        }
    }

    fn type_matches(&self, type_condition: &str, runtime_type: &str) -> bool {
        type_condition == runtime_type || self.schema.is_subtype(type_condition, runtime_type)
    }

    fn collect_fields(
        &self,
        selections: &[Selection],
        runtime_type: &str,
        response_path: &Path,
        out: &mut CollectedFields,
        errors: &mut Vec<graphql::Error>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) => match out.fields.entry(field.response_key().clone()) {
                    Entry::Occupied(mut existing) => {
                        if let Some(additional) = &field.selection_set {
                            existing
                                .get_mut()
                                .selection_set
                                .get_or_insert_with(Vec::new)
                                .extend(additional.iter().cloned());
                        }
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(field.clone());
                    }
                },
                Selection::InlineFragment {
                    type_condition,
                    defer_label,
                    selection_set,
                } => {
                    if !self.type_matches(type_condition, runtime_type) {
                        continue;
                    }
                    match defer_label {
                        // Deferred sub-trees are recorded, never walked:
                        // their data arrives in a later incremental payload.
                        Some(label) => {
                            out.deferred.insert(label.clone());
                        }
                        None => {
                            self.collect_fields(
                                selection_set,
                                runtime_type,
                                response_path,
                                out,
                                errors,
                            );
                        }
                    }
                }
                Selection::FragmentSpread { name, defer_label } => {
                    match (self.fragments.get(name), defer_label) {
                        (Some(fragment), _)
                            if !self.type_matches(&fragment.type_condition, runtime_type) => {}
                        (Some(fragment), None) => {
                            self.collect_fields(
                                &fragment.selection_set,
                                runtime_type,
                                response_path,
                                out,
                                errors,
                            );
                            out.fulfilled.insert(name.clone());
                        }
                        (_, Some(label)) => {
                            out.deferred.insert(label.clone());
                        }
                        (None, None) => {
                            errors.push(
                                graphql::Error::builder()
                                    .message(format!("fragment '{name}' is not defined"))
                                    .path(response_path.clone())
                                    .extension_code("UNKNOWN_FRAGMENT")
                                    .build(),
                            );
                        }
                    }
                }
            }
        }
    }

    fn execute_selection_set<'a, A: ResultAccumulator>(
        &'a self,
        accumulator: &'a A,
        selections: &'a [Selection],
        object: &'a S::RawObject,
        declared_type: &'a str,
        response_path: Path,
        inherited_reference: CacheReference,
        errors: &'a mut Vec<graphql::Error>,
    ) -> BoxFuture<'a, Result<A::ObjectResult, InvalidValue>> {
        Box::pin(async move {
            let type_name = self
                .source
                .type_name(object)
                .unwrap_or_else(|| declared_type.to_owned());
            // Identified objects store under their computed key; everything
            // else falls back to the reference derived from its path.
            let cache_reference = if accumulator.requires_cache_key_computation() {
                self.source
                    .compute_cache_key(object, &type_name)
                    .unwrap_or(inherited_reference)
            } else {
                inherited_reference
            };

            let mut collected = CollectedFields::default();
            self.collect_fields(selections, &type_name, &response_path, &mut collected, errors);
            let CollectedFields {
                fields,
                fulfilled,
                mut deferred,
            } = collected;
            // Fulfillment dominates: a fragment executed here is no longer
            // outstanding under any spelling.
            deferred.retain(|label| !fulfilled.contains(label));
            let fields: Vec<Field> = fields.into_values().collect();

            let info = ObjectExecutionInfo {
                type_name,
                response_path,
                cache_reference,
                fulfilled,
                deferred,
            };

            let mut entries = Vec::with_capacity(fields.len());
            for field in &fields {
                let mut field_path = info.response_path.clone();
                field_path.push(PathElement::Key(field.response_key().as_str().to_owned()));
                let field_cache = info
                    .cache_reference
                    .appending(&PathElement::Key(field.storage_key().as_str().to_owned()));
                let field_info = FieldExecutionInfo {
                    field,
                    parent: &info,
                    response_path: field_path.clone(),
                    cache_path: field_cache.clone(),
                };

                let value = match self.source.resolve_field(&field_info, object).await {
                    Err(err) => {
                        errors.push(err.to_graphql_error());
                        Err(InvalidValue)
                    }
                    Ok(None) => self.handle_missing(accumulator, field, &field_info, errors),
                    Ok(Some(value)) => {
                        self.complete_value(
                            accumulator,
                            value,
                            &field.field_type,
                            field,
                            &info,
                            field_path,
                            field_cache,
                            errors,
                        )
                        .await
                    }
                };

                let value = match value {
                    Ok(value) => value,
                    Err(InvalidValue) => {
                        if field.field_type.is_non_null() {
                            return Err(InvalidValue);
                        }
                        record(accumulator.accept_null(&field_info), errors)?
                    }
                };
                if let Some(entry) =
                    record(accumulator.accept_field_entry(value, &field_info), errors)?
                {
                    entries.push(entry);
                }
            }

            record(accumulator.finish_object(entries, &info), errors)
        })
    }

    fn handle_missing<A: ResultAccumulator>(
        &self,
        accumulator: &A,
        field: &Field,
        info: &FieldExecutionInfo<'_>,
        errors: &mut Vec<graphql::Error>,
    ) -> Result<A::FieldValue, InvalidValue> {
        let allowed = match self.missing_value_policy {
            MissingValuePolicy::Disallow => false,
            MissingValuePolicy::AllowForOptionalFields => !field.field_type.is_non_null(),
            MissingValuePolicy::AllowForAllFields => true,
        };
        if allowed {
            record(accumulator.accept_missing(info), errors)
        } else {
            errors.push(
                ExecutionError::MissingValue {
                    path: info.response_path.clone(),
                }
                .to_graphql_error(),
            );
            Err(InvalidValue)
        }
    }

    fn type_mismatch(
        &self,
        field_type: &FieldType,
        response_path: &Path,
        errors: &mut Vec<graphql::Error>,
    ) -> InvalidValue {
        errors.push(
            ExecutionError::TypeMismatch {
                path: response_path.clone(),
                expected: field_type.to_string(),
            }
            .to_graphql_error(),
        );
        InvalidValue
    }

    #[allow(clippy::too_many_arguments)]
    fn complete_value<'a, A: ResultAccumulator>(
        &'a self,
        accumulator: &'a A,
        value: ResolvedValue<S::RawObject>,
        field_type: &'a FieldType,
        field: &'a Field,
        parent: &'a ObjectExecutionInfo,
        response_path: Path,
        cache_path: CacheReference,
        errors: &'a mut Vec<graphql::Error>,
    ) -> BoxFuture<'a, Result<A::FieldValue, InvalidValue>> {
        Box::pin(async move {
            if let FieldType::NonNull(inner) = field_type {
                return match value {
                    ResolvedValue::Null => {
                        Err(self.type_mismatch(field_type, &response_path, errors))
                    }
                    value => {
                        self.complete_value(
                            accumulator,
                            value,
                            inner,
                            field,
                            parent,
                            response_path,
                            cache_path,
                            errors,
                        )
                        .await
                    }
                };
            }

            let info = FieldExecutionInfo {
                field,
                parent,
                response_path: response_path.clone(),
                cache_path: cache_path.clone(),
            };

            if let ResolvedValue::Null = value {
                return record(accumulator.accept_null(&info), errors);
            }

            match field_type {
                FieldType::NonNull(_) => unreachable!("handled above"),
                FieldType::List(inner) => {
                    let ResolvedValue::List(items) = value else {
                        return Err(self.type_mismatch(field_type, &response_path, errors));
                    };
                    let mut completed = Vec::with_capacity(items.len());
                    for (index, item) in items.into_iter().enumerate() {
                        let element_path = response_path.join(PathElement::Index(index));
                        let element_cache = cache_path.appending(&PathElement::Index(index));
                        let element = match item {
                            Ok(value) => {
                                self.complete_value(
                                    accumulator,
                                    value,
                                    inner,
                                    field,
                                    parent,
                                    element_path.clone(),
                                    element_cache.clone(),
                                    errors,
                                )
                                .await
                            }
                            Err(err) => {
                                errors.push(err.to_graphql_error());
                                Err(InvalidValue)
                            }
                        };
                        match element {
                            Ok(value) => completed.push(value),
                            Err(InvalidValue) => {
                                // One bad element nulls its own position,
                                // unless the element type forbids null.
                                if inner.is_non_null() {
                                    return Err(InvalidValue);
                                }
                                let element_info = FieldExecutionInfo {
                                    field,
                                    parent,
                                    response_path: element_path,
                                    cache_path: element_cache,
                                };
                                completed
                                    .push(record(accumulator.accept_null(&element_info), errors)?);
                            }
                        }
                    }
                    record(accumulator.accept_list(completed, &info), errors)
                }
                FieldType::String => match value {
                    ResolvedValue::Scalar(v) if v.is_string() => {
                        record(accumulator.accept_scalar(v, &info), errors)
                    }
                    _ => Err(self.type_mismatch(field_type, &response_path, errors)),
                },
                FieldType::Int => match value {
                    ResolvedValue::Scalar(v) if v.is_i64() || v.is_u64() => {
                        // GraphQL Int is 32 bits on the wire.
                        let in_range = v
                            .as_i64()
                            .map(|i| i32::try_from(i).is_ok())
                            .unwrap_or(false);
                        if in_range {
                            record(accumulator.accept_scalar(v, &info), errors)
                        } else {
                            errors.push(
                                ExecutionError::InvalidScalar {
                                    path: response_path.clone(),
                                    reason: "Int value does not fit in 32 bits".to_string(),
                                }
                                .to_graphql_error(),
                            );
                            Err(InvalidValue)
                        }
                    }
                    _ => Err(self.type_mismatch(field_type, &response_path, errors)),
                },
                FieldType::Float => match value {
                    ResolvedValue::Scalar(v) if v.is_number() => {
                        record(accumulator.accept_scalar(v, &info), errors)
                    }
                    _ => Err(self.type_mismatch(field_type, &response_path, errors)),
                },
                FieldType::Id => match value {
                    // IDs are serialized as strings or integers.
                    ResolvedValue::Scalar(v) if v.is_string() || v.is_i64() || v.is_u64() => {
                        record(accumulator.accept_scalar(v, &info), errors)
                    }
                    _ => Err(self.type_mismatch(field_type, &response_path, errors)),
                },
                FieldType::Boolean => match value {
                    ResolvedValue::Scalar(v) if v.is_boolean() => {
                        record(accumulator.accept_scalar(v, &info), errors)
                    }
                    _ => Err(self.type_mismatch(field_type, &response_path, errors)),
                },
                FieldType::Named(name) if self.schema.is_custom_scalar(name) => match value {
                    ResolvedValue::Scalar(v) => {
                        record(accumulator.accept_custom_scalar(v, &info), errors)
                    }
                    _ => Err(self.type_mismatch(field_type, &response_path, errors)),
                },
                FieldType::Named(name) => {
                    let ResolvedValue::Object(raw) = value else {
                        return Err(self.type_mismatch(field_type, &response_path, errors));
                    };
                    let Some(selections) = &field.selection_set else {
                        return Err(self.type_mismatch(field_type, &response_path, errors));
                    };
                    let child = self
                        .execute_selection_set(
                            accumulator,
                            selections,
                            &raw,
                            name,
                            response_path.clone(),
                            cache_path.clone(),
                            errors,
                        )
                        .await?;
                    record(accumulator.accept_child_object(child, &info), errors)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;
    use crate::execution::DataDictMapper;
    use crate::execution::DataValue;
    use crate::execution::DependencyTracker;
    use crate::execution::ResultNormalizer;
    use crate::execution::Zip3;
    use crate::execution::source::JsonExecutionSource;
    use crate::json_ext::Object;
    use crate::spec::Fragment;
    use crate::spec::OperationKind;
    use crate::spec::Schema;

    fn hero_schema() -> Arc<Schema> {
        Arc::new(
            Schema::default()
                .with_subtypes("Character", ["Human", "Droid"])
                .with_key_field("Human", "id")
                .with_key_field("Droid", "id"),
        )
    }

    fn executor(schema: Arc<Schema>, fragments: Fragments) -> GraphQLExecutor<JsonExecutionSource> {
        GraphQLExecutor::new(JsonExecutionSource::new(schema.clone()), schema, fragments)
    }

    fn as_object(value: serde_json_bytes::Value) -> Object {
        match value {
            serde_json_bytes::Value::Object(object) => object,
            other => panic!("expected object, got {other:?}"),
        }
    }

    fn hero_operation() -> Operation {
        Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("hero", FieldType::named("Character")).with_selections(vec![
                    Selection::field(Field::new("__typename", FieldType::non_null(
                        FieldType::String,
                    ))),
                    Selection::field(Field::new("id", FieldType::non_null(FieldType::Id))),
                    Selection::field(Field::new("name", FieldType::String)),
                ]),
            )],
        )
    }

    #[tokio::test]
    async fn zipped_execution_produces_all_three_outputs_in_one_pass() {
        let operation = hero_operation();
        let root = as_object(json!({
            "hero": { "__typename": "Droid", "id": "2001", "name": "R2-D2" }
        }));
        let executor = executor(hero_schema(), Fragments::default());
        let accumulator = Zip3(DataDictMapper, ResultNormalizer, DependencyTracker);

        let outcome = executor.execute(&operation, &root, &accumulator).await;
        assert_eq!(outcome.errors, vec![]);
        let ((data, (root_reference, records)), dependent_keys) = outcome.result.unwrap();

        assert_eq!(
            data.to_json(),
            json!({ "hero": { "__typename": "Droid", "id": "2001", "name": "R2-D2" } })
        );
        assert_eq!(root_reference.as_str(), "QUERY_ROOT");
        assert_eq!(
            records.get("QUERY_ROOT").unwrap().get("hero"),
            Some(&crate::cache::RecordValue::Reference(CacheReference::from(
                "Droid:2001"
            ))),
        );
        assert_eq!(
            records.get("Droid:2001").unwrap().get("name"),
            Some(&crate::cache::RecordValue::Scalar(json!("R2-D2"))),
        );
        assert!(dependent_keys.contains("QUERY_ROOT.hero"));
        assert!(dependent_keys.contains("Droid:2001.name"));
    }

    #[tokio::test]
    async fn unidentified_objects_fall_back_to_path_derived_references() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("settings", FieldType::named("Settings")).with_selections(vec![
                    Selection::field(Field::new("theme", FieldType::String)),
                ]),
            )],
        );
        let root = as_object(json!({ "settings": { "theme": "dark" } }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &ResultNormalizer).await;
        assert_eq!(outcome.errors, vec![]);
        let (_, records) = outcome.result.unwrap();
        assert_eq!(
            records.get("QUERY_ROOT.settings").unwrap().get("theme"),
            Some(&crate::cache::RecordValue::Scalar(json!("dark"))),
        );
    }

    #[tokio::test]
    async fn aliases_keep_response_keys_distinct() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![
                Selection::field(Field::new("name", FieldType::String).aliased("first")),
                Selection::field(Field::new("name", FieldType::String).aliased("second")),
            ],
        );
        let root = as_object(json!({ "first": "Luke", "second": "Luke" }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(
            outcome.result.unwrap().to_json(),
            json!({ "first": "Luke", "second": "Luke" })
        );
    }

    #[tokio::test]
    async fn type_condition_gates_fragment_fields_on_the_runtime_type() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("hero", FieldType::named("Character")).with_selections(vec![
                    Selection::field(Field::new("__typename", FieldType::non_null(
                        FieldType::String,
                    ))),
                    Selection::inline_fragment(
                        "Droid",
                        vec![Selection::field(Field::new(
                            "primaryFunction",
                            FieldType::String,
                        ))],
                    ),
                    Selection::inline_fragment(
                        "Human",
                        vec![Selection::field(Field::new("homePlanet", FieldType::String))],
                    ),
                ]),
            )],
        );
        let root = as_object(json!({
            "hero": { "__typename": "Droid", "primaryFunction": "Astromech" }
        }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.errors, vec![]);
        assert_eq!(
            outcome.result.unwrap().to_json(),
            json!({ "hero": { "__typename": "Droid", "primaryFunction": "Astromech" } })
        );
    }

    #[tokio::test]
    async fn executed_named_fragments_are_fulfilled_and_deferred_ones_recorded() {
        let mut fragments = Fragments::default();
        fragments.insert(Fragment::new(
            "CharacterName",
            "Character",
            vec![Selection::field(Field::new("name", FieldType::String))],
        ));
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("hero", FieldType::named("Character")).with_selections(vec![
                    Selection::field(Field::new("__typename", FieldType::non_null(
                        FieldType::String,
                    ))),
                    Selection::fragment_spread("CharacterName"),
                    Selection::deferred_inline_fragment(
                        "Character",
                        "slowFields",
                        vec![Selection::field(Field::new("biography", FieldType::String))],
                    ),
                ]),
            )],
        );
        let root = as_object(json!({ "hero": { "__typename": "Droid", "name": "R2-D2" } }));
        let executor = executor(hero_schema(), fragments);

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.errors, vec![]);
        let data = outcome.result.unwrap();
        // The deferred sub-tree was not executed.
        assert_eq!(
            data.to_json(),
            json!({ "hero": { "__typename": "Droid", "name": "R2-D2" } })
        );
        let hero = match data.get("hero").unwrap() {
            DataValue::Object(dict) => dict,
            other => panic!("expected object, got {other:?}"),
        };
        assert!(hero.fulfilled().contains("CharacterName"));
        assert!(hero.deferred().contains("slowFields"));
        assert!(!hero.is_complete());
    }

    #[tokio::test]
    async fn errors_propagate_to_the_nearest_nullable_ancestor() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("hero", FieldType::named("Character")).with_selections(vec![
                    Selection::field(Field::new("name", FieldType::non_null(FieldType::String))),
                ]),
            )],
        );
        // `name` is non-null but the server sent a number.
        let root = as_object(json!({ "hero": { "name": 42 } }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.result.unwrap().to_json(), json!({ "hero": null }));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, Some(Path::from("hero/name")));
    }

    #[tokio::test]
    async fn a_bad_list_element_nulls_only_its_own_position() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(Field::new(
                "names",
                FieldType::list(FieldType::String),
            ))],
        );
        let root = as_object(json!({ "names": ["Luke", 3, "Leia"] }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(
            outcome.result.unwrap().to_json(),
            json!({ "names": ["Luke", null, "Leia"] })
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, Some(Path::from("names/1")));
    }

    #[tokio::test]
    async fn missing_value_policy_controls_absent_fields() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![
                Selection::field(Field::new("name", FieldType::String)),
                Selection::field(Field::new("nickname", FieldType::String)),
            ],
        );
        let root = as_object(json!({ "name": "Luke" }));

        let strict = executor(hero_schema(), Fragments::default());
        let outcome = strict.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(
            outcome.result.unwrap().to_json(),
            json!({ "name": "Luke", "nickname": null })
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, Some(Path::from("nickname")));

        let lenient = executor(hero_schema(), Fragments::default())
            .with_missing_value_policy(MissingValuePolicy::AllowForOptionalFields);
        let outcome = lenient.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.errors, vec![]);
        // The absent optional field is omitted, not nulled.
        assert_eq!(outcome.result.unwrap().to_json(), json!({ "name": "Luke" }));
    }

    #[tokio::test]
    async fn int_values_outside_32_bits_are_rejected() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(Field::new("count", FieldType::Int))],
        );
        let root = as_object(json!({ "count": 5_000_000_000_i64 }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(outcome.result.unwrap().to_json(), json!({ "count": null }));
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("32 bits"));
    }

    #[tokio::test]
    async fn boolean_fields_accept_booleans_and_nothing_else() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![
                Selection::field(Field::new("active", FieldType::Boolean)),
                Selection::field(Field::new("retired", FieldType::Boolean)),
            ],
        );
        let root = as_object(json!({ "active": true, "retired": "yes" }));
        let executor = executor(hero_schema(), Fragments::default());

        let outcome = executor.execute(&operation, &root, &DataDictMapper).await;
        assert_eq!(
            outcome.result.unwrap().to_json(),
            json!({ "active": true, "retired": null })
        );
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path, Some(Path::from("retired")));
    }
}
