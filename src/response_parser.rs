//! The public parsing entry points.
//!
//! [`ResponseParser`] turns wire bytes into [`ParsedResult`]s: a single-shot
//! JSON body through [`ResponseParser::parse_single`], or a multipart body
//! through [`ResponseParser::parse_multipart`], which frames the stream,
//! classifies each part under the negotiated sub-protocol and merges `@defer`
//! payloads into the running result as they arrive.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use http::HeaderMap;
use http::header::CONTENT_TYPE;
use serde_json_bytes::Value;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::cache::CacheReference;
use crate::cache::RecordSet;
use crate::error::FramingError;
use crate::error::MergeError;
use crate::error::ProtocolError;
use crate::error::ResponseError;
use crate::execution::DataDict;
use crate::execution::DataDictMapper;
use crate::execution::DependencyTracker;
use crate::execution::ExecutionOutcome;
use crate::execution::GraphQLExecutor;
use crate::execution::JsonExecutionSource;
use crate::execution::MissingValuePolicy;
use crate::execution::ResultNormalizer;
use crate::execution::Zip2;
use crate::execution::Zip3;
use crate::graphql;
use crate::json_ext::Object;
use crate::json_ext::Path;
use crate::protocols::MultipartFramer;
use crate::protocols::SubProtocol;
use crate::protocols::negotiate_content_type;
use crate::protocols::parse_chunk;
use crate::spec::Fragments;
use crate::spec::Operation;
use crate::spec::SchemaMetadata;
use crate::spec::Selection;

/// A materialized response: typed data alongside the errors, extensions and
/// cache dependency keys collected while executing it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphQLResponse {
    /// `None` when the response carried no data or execution nulled the
    /// whole tree.
    pub data: Option<DataDict>,
    pub errors: Vec<graphql::Error>,
    pub extensions: Object,
    /// Cache paths this result was read from; watching them for changes
    /// detects staleness.
    pub dependent_keys: HashSet<String>,
}

/// The output of one parse: the response plus, when normalization is
/// enabled, the records ready for the store's write path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResult {
    pub response: GraphQLResponse,
    pub cache_records: Option<RecordSet>,
}

impl ParsedResult {
    /// Merge one incremental item into this result. Fails without touching
    /// anything if the item's path does not address data shaped by the
    /// original execution or disagrees with a previously merged value.
    fn merge_incremental(&mut self, item: IncrementalGraphQLResult) -> Result<(), MergeError> {
        if let Some(incoming) = item.data {
            let Some(data) = self.response.data.as_mut() else {
                return Err(MergeError::InvalidPathShape {
                    path: item.path,
                    expected: "object",
                });
            };
            data.merge_at(&item.path, incoming)?;
        }
        if let Some(records) = item.cache_records {
            match &mut self.cache_records {
                Some(existing) => {
                    let _ = existing.merge(records);
                }
                None => self.cache_records = Some(records),
            }
        }
        self.response.errors.extend(item.errors);
        self.response.dependent_keys.extend(item.dependent_keys);
        for (key, value) in item.extensions {
            self.response.extensions.insert(key, value);
        }
        Ok(())
    }
}

/// One incremental `@defer` item, already executed against its deferred
/// fragment's selections and ready to merge.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementalGraphQLResult {
    pub label: Option<String>,
    /// Response path from the operation root to the object the fragment
    /// applies to.
    pub path: Path,
    pub data: Option<DataDict>,
    pub errors: Vec<graphql::Error>,
    pub extensions: Object,
    pub dependent_keys: HashSet<String>,
    pub cache_records: Option<RecordSet>,
}

/// A deferred fragment definition registered for the operation, keyed by
/// its label.
#[derive(Debug, Clone)]
struct DeferredFragment {
    type_condition: String,
    selection_set: Vec<Selection>,
}

fn collect_deferred_fragments(
    selections: &[Selection],
    fragments: &Fragments,
    visited: &mut HashSet<String>,
    out: &mut HashMap<String, DeferredFragment>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if let Some(selection_set) = &field.selection_set {
                    collect_deferred_fragments(selection_set, fragments, visited, out);
                }
            }
            Selection::InlineFragment {
                type_condition,
                defer_label,
                selection_set,
            } => {
                if let Some(label) = defer_label {
                    out.insert(
                        label.clone(),
                        DeferredFragment {
                            type_condition: type_condition.clone(),
                            selection_set: selection_set.clone(),
                        },
                    );
                }
                collect_deferred_fragments(selection_set, fragments, visited, out);
            }
            Selection::FragmentSpread { name, defer_label } => {
                let Some(fragment) = fragments.get(name) else {
                    continue;
                };
                if let Some(label) = defer_label {
                    out.insert(
                        label.clone(),
                        DeferredFragment {
                            type_condition: fragment.type_condition.clone(),
                            selection_set: fragment.selection_set.clone(),
                        },
                    );
                }
                if visited.insert(name.clone()) {
                    collect_deferred_fragments(&fragment.selection_set, fragments, visited, out);
                }
            }
        }
    }
}

/// Parses wire responses for one operation.
pub struct ResponseParser {
    executor: GraphQLExecutor<JsonExecutionSource>,
    operation: Operation,
    deferred_fragments: HashMap<String, DeferredFragment>,
    normalize: bool,
}

impl ResponseParser {
    pub fn new(
        operation: Operation,
        schema: Arc<dyn SchemaMetadata>,
        fragments: Fragments,
    ) -> Self {
        let mut deferred_fragments = HashMap::new();
        collect_deferred_fragments(
            &operation.selection_set,
            &fragments,
            &mut HashSet::new(),
            &mut deferred_fragments,
        );
        let executor =
            GraphQLExecutor::new(JsonExecutionSource::new(schema.clone()), schema, fragments);
        Self {
            executor,
            operation,
            deferred_fragments,
            normalize: true,
        }
    }

    /// Skip producing cache records; the parse yields data, errors and
    /// dependent keys only.
    pub fn without_cache_records(mut self) -> Self {
        self.normalize = false;
        self
    }

    pub fn with_missing_value_policy(mut self, policy: MissingValuePolicy) -> Self {
        self.executor = self.executor.with_missing_value_policy(policy);
        self
    }

    /// Parse a single-shot (non-multipart) response body.
    pub async fn parse_single(&self, bytes: &Bytes) -> Result<ParsedResult, ResponseError> {
        let response = graphql::Response::from_bytes(bytes)?;
        self.parse_response(response).await
    }

    async fn parse_response(
        &self,
        response: graphql::Response,
    ) -> Result<ParsedResult, ResponseError> {
        let mut errors = response.errors;
        let (data, cache_records, dependent_keys) = match response.data {
            Some(Value::Object(root)) => self.execute_root(&root, &mut errors).await,
            Some(Value::Null) | None => (None, None, HashSet::new()),
            Some(_) => {
                return Err(ProtocolError::MalformedResponse {
                    reason: "data is not an object".to_string(),
                }
                .into());
            }
        };
        Ok(ParsedResult {
            response: GraphQLResponse {
                data,
                errors,
                extensions: response.extensions,
                dependent_keys,
            },
            cache_records,
        })
    }

    async fn execute_root(
        &self,
        root: &Object,
        errors: &mut Vec<graphql::Error>,
    ) -> (Option<DataDict>, Option<RecordSet>, HashSet<String>) {
        if self.normalize {
            let outcome = self
                .executor
                .execute(
                    &self.operation,
                    root,
                    &Zip3(DataDictMapper, ResultNormalizer, DependencyTracker),
                )
                .await;
            errors.extend(outcome.errors);
            match outcome.result {
                Some(((data, (_, records)), keys)) => (Some(data), Some(records), keys),
                None => (None, None, HashSet::new()),
            }
        } else {
            let outcome = self
                .executor
                .execute(&self.operation, root, &Zip2(DataDictMapper, DependencyTracker))
                .await;
            errors.extend(outcome.errors);
            match outcome.result {
                Some((data, keys)) => (Some(data), None, keys),
                None => (None, None, HashSet::new()),
            }
        }
    }

    /// Execute one incremental item against the deferred fragment its label
    /// names. The item's cache records are rooted at the key derived from
    /// the operation root and the item's path.
    pub async fn parse_incremental_item(
        &self,
        item: &graphql::IncrementalResponse,
    ) -> Result<IncrementalGraphQLResult, ResponseError> {
        let path = item.path.clone().unwrap_or_else(Path::empty);
        let fragment = item
            .label
            .as_deref()
            .and_then(|label| self.deferred_fragments.get(label))
            .ok_or_else(|| ProtocolError::UnknownDeferredFragment {
                label: item.label.clone(),
                path: path.clone(),
            })?;
        let label = item.label.clone().expect("fragment lookup requires a label");

        let mut errors = item.errors.clone();
        let (data, cache_records, dependent_keys) = match &item.data {
            Some(Value::Object(root)) => {
                let cache_root = CacheReference::for_incremental(self.operation.kind, &path);
                let (data, records, keys) = if self.normalize {
                    let outcome = self
                        .executor
                        .execute_at(
                            &fragment.selection_set,
                            &fragment.type_condition,
                            root,
                            path.clone(),
                            cache_root,
                            &Zip3(DataDictMapper, ResultNormalizer, DependencyTracker),
                        )
                        .await;
                    errors.extend(outcome.errors);
                    match outcome.result {
                        Some(((data, (_, records)), keys)) => (Some(data), Some(records), keys),
                        None => (None, None, HashSet::new()),
                    }
                } else {
                    let outcome: ExecutionOutcome<_> = self
                        .executor
                        .execute_at(
                            &fragment.selection_set,
                            &fragment.type_condition,
                            root,
                            path.clone(),
                            cache_root,
                            &Zip2(DataDictMapper, DependencyTracker),
                        )
                        .await;
                    errors.extend(outcome.errors);
                    match outcome.result {
                        Some((data, keys)) => (Some(data), None, keys),
                        None => (None, None, HashSet::new()),
                    }
                };
                let data = data.map(|mut dict| {
                    dict.mark_fulfilled(label.clone());
                    dict
                });
                (data, records, keys)
            }
            Some(Value::Null) | None => (None, None, HashSet::new()),
            Some(_) => {
                return Err(ProtocolError::MalformedResponse {
                    reason: "incremental item data is not an object".to_string(),
                }
                .into());
            }
        };

        Ok(IncrementalGraphQLResult {
            label: Some(label),
            path,
            data,
            errors,
            extensions: item.extensions.clone(),
            dependent_keys,
            cache_records,
        })
    }

    /// Parse a multipart response body into a stream of results.
    ///
    /// Under `subscriptionSpec=1.0` each yielded result is an independent
    /// execution of one subscription event. Under `deferSpec=20220824` the
    /// primary payload seeds a running result and every incremental batch
    /// yields an updated snapshot of it; a failed item merge yields an `Err`
    /// for that chunk without disturbing the running result. `cancellation`
    /// is checked between incremental items.
    pub fn parse_multipart<'a, S>(
        &'a self,
        headers: &HeaderMap,
        body: S,
        cancellation: CancellationToken,
    ) -> Result<impl Stream<Item = Result<ParsedResult, ResponseError>> + 'a, ResponseError>
    where
        S: Stream<Item = Bytes> + Unpin + Send + 'a,
    {
        let Some(negotiated) = negotiate_content_type(headers)? else {
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return Err(FramingError::NotMultipart { content_type }.into());
        };

        struct State<S> {
            parts: MultipartFramer<S>,
            protocol: SubProtocol,
            prior: Option<ParsedResult>,
            cancellation: CancellationToken,
            finished: bool,
        }

        let state = State {
            parts: MultipartFramer::new(body, &negotiated.boundary),
            protocol: negotiated.protocol,
            prior: None,
            cancellation,
            finished: false,
        };

        Ok(futures::stream::unfold(state, move |mut state| async move {
            if state.finished {
                return None;
            }
            loop {
                let part = state.parts.next().await?;
                let response = match parse_chunk(state.protocol, &part) {
                    // Heartbeats and empty transport envelopes never
                    // surface.
                    Ok(None) => {
                        trace!("skipping contentless multipart part");
                        continue;
                    }
                    Ok(Some(response)) => response,
                    Err(err) => {
                        state.finished = true;
                        return Some((Err(err.into()), state));
                    }
                };
                let result = match state.protocol {
                    SubProtocol::Subscription => self.parse_response(response).await,
                    SubProtocol::Defer => {
                        self.apply_defer_chunk(&mut state.prior, response, &state.cancellation)
                            .await
                    }
                };
                return match result {
                    Ok(result) => Some((Ok(result), state)),
                    Err(err) => {
                        // A rejected item merge only loses that item; any
                        // other failure ends the stream.
                        if !matches!(err, ResponseError::Merge(_)) {
                            state.finished = true;
                        }
                        Some((Err(err), state))
                    }
                };
            }
        }))
    }

    async fn apply_defer_chunk(
        &self,
        prior: &mut Option<ParsedResult>,
        response: graphql::Response,
        cancellation: &CancellationToken,
    ) -> Result<ParsedResult, ResponseError> {
        // `deferSpec=20220824` patch parts carry an `incremental` batch and
        // no top-level `path`; only the opening part is a primary response.
        if response.incremental.is_empty() && response.path.is_none() {
            let parsed = self.parse_response(response).await?;
            *prior = Some(parsed.clone());
            return Ok(parsed);
        }

        let Some(running) = prior.as_mut() else {
            return Err(ProtocolError::IncrementalWithoutPrior.into());
        };
        // Older servers patch with a top-level `data` + `path` pair instead
        // of an `incremental` batch; fold that shape into a one-item batch.
        let (items, trailing_errors) = if response.incremental.is_empty() {
            let item = graphql::IncrementalResponse::builder()
                .and_label(response.label)
                .and_data(response.data)
                .and_path(response.path)
                .errors(response.errors)
                .extensions(response.extensions)
                .build();
            (vec![item], Vec::new())
        } else {
            (response.incremental, response.errors)
        };
        for item in &items {
            if cancellation.is_cancelled() {
                return Err(ResponseError::Cancelled);
            }
            let incremental = self.parse_incremental_item(item).await?;
            running.merge_incremental(incremental)?;
        }
        running.response.errors.extend(trailing_errors);
        Ok(running.clone())
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use pretty_assertions::assert_eq;
    use serde_json_bytes::json;

    use super::*;
    use crate::execution::DataValue;
    use crate::spec::Field;
    use crate::spec::FieldType;
    use crate::spec::OperationKind;
    use crate::spec::Schema;

    const DEFER_CONTENT_TYPE: &str = "multipart/mixed;boundary=\"graphql\";deferSpec=20220824";
    const SUBSCRIPTION_CONTENT_TYPE: &str =
        "multipart/mixed;boundary=\"graphql\";subscriptionSpec=1.0";

    fn headers(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, http::HeaderValue::from_static(content_type));
        headers
    }

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::default()
                .with_subtypes("Character", ["Human", "Droid"])
                .with_key_field("Droid", "id"),
        )
    }

    fn deferred_hero_operation() -> Operation {
        Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(
                Field::new("hero", FieldType::named("Character")).with_selections(vec![
                    Selection::field(Field::new("id", FieldType::non_null(FieldType::Id))),
                    Selection::field(Field::new("name", FieldType::String)),
                    Selection::deferred_inline_fragment(
                        "Character",
                        "heroDetails",
                        vec![Selection::field(Field::new("biography", FieldType::String))],
                    ),
                ]),
            )],
        )
    }

    fn parser(operation: Operation) -> ResponseParser {
        ResponseParser::new(operation, schema(), Fragments::default())
    }

    fn part(body: &str) -> String {
        format!("--graphql\r\ncontent-type: application/json\r\n\r\n{body}\r\n")
    }

    #[tokio::test]
    async fn single_shot_parse_produces_data_records_and_dependent_keys() {
        let operation = Operation::new(
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
        );
        let parser = parser(operation);
        let bytes = Bytes::from_static(
            br#"{"data":{"hero":{"__typename":"Droid","id":"2001","name":"R2-D2"}}}"#,
        );

        let parsed = parser.parse_single(&bytes).await.unwrap();
        assert_eq!(parsed.response.errors, vec![]);
        assert_eq!(
            parsed.response.data.unwrap().to_json(),
            json!({ "hero": { "__typename": "Droid", "id": "2001", "name": "R2-D2" } })
        );
        let records = parsed.cache_records.unwrap();
        assert!(records.get("Droid:2001").is_some());
        assert!(parsed.response.dependent_keys.contains("Droid:2001.name"));
    }

    #[tokio::test]
    async fn without_cache_records_skips_normalization() {
        let operation = Operation::new(
            OperationKind::Query,
            "Query",
            vec![Selection::field(Field::new("name", FieldType::String))],
        );
        let parser = parser(operation).without_cache_records();
        let parsed = parser
            .parse_single(&Bytes::from_static(br#"{"data":{"name":"Luke"}}"#))
            .await
            .unwrap();
        assert_eq!(parsed.cache_records, None);
        assert_eq!(parsed.response.dependent_keys.len(), 1);
    }

    #[tokio::test]
    async fn defer_stream_merges_incremental_payloads_into_the_running_result() {
        let parser = parser(deferred_hero_operation());
        let body = [
            part(r#"{"data":{"hero":{"id":"2001","name":"R2-D2"}},"hasNext":true}"#),
            part(
                r#"{"incremental":[{"label":"heroDetails","path":["hero"],"data":{"biography":"Astromech droid"}}],"hasNext":false}"#,
            ),
            "--graphql--".to_string(),
        ]
        .concat();

        let results: Vec<_> = parser
            .parse_multipart(
                &headers(DEFER_CONTENT_TYPE),
                stream::iter(vec![Bytes::from(body)]),
                CancellationToken::new(),
            )
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 2);

        let initial = results[0].as_ref().unwrap();
        let initial_hero = match initial.response.data.as_ref().unwrap().get("hero").unwrap() {
            DataValue::Object(dict) => dict,
            other => panic!("expected object, got {other:?}"),
        };
        assert!(initial_hero.deferred().contains("heroDetails"));
        assert!(!initial_hero.is_complete());

        let merged = results[1].as_ref().unwrap();
        assert_eq!(
            merged.response.data.as_ref().unwrap().to_json(),
            json!({ "hero": {
                "id": "2001",
                "name": "R2-D2",
                "biography": "Astromech droid",
            }})
        );
        let merged_hero = match merged.response.data.as_ref().unwrap().get("hero").unwrap() {
            DataValue::Object(dict) => dict,
            other => panic!("expected object, got {other:?}"),
        };
        assert!(merged_hero.fulfilled().contains("heroDetails"));
        assert!(merged_hero.is_complete());
        // The incremental record lands under the path-derived key.
        assert!(
            merged
                .cache_records
                .as_ref()
                .unwrap()
                .get("QUERY_ROOT.hero")
                .is_some()
        );
    }

    #[tokio::test]
    async fn path_addressed_patch_parts_merge_like_an_incremental_batch() {
        let parser = parser(deferred_hero_operation());
        let body = [
            part(r#"{"data":{"hero":{"id":"2001","name":"R2-D2"}},"hasNext":true}"#),
            part(
                r#"{"label":"heroDetails","path":["hero"],"data":{"biography":"Astromech droid"},"hasNext":false}"#,
            ),
            "--graphql--".to_string(),
        ]
        .concat();

        let results: Vec<_> = parser
            .parse_multipart(
                &headers(DEFER_CONTENT_TYPE),
                stream::iter(vec![Bytes::from(body)]),
                CancellationToken::new(),
            )
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 2);

        let merged = results[1].as_ref().unwrap();
        assert_eq!(
            merged.response.data.as_ref().unwrap().to_json(),
            json!({ "hero": {
                "id": "2001",
                "name": "R2-D2",
                "biography": "Astromech droid",
            }})
        );
    }

    #[tokio::test]
    async fn incremental_without_a_prior_response_is_an_error() {
        let parser = parser(deferred_hero_operation());
        let body = [
            part(
                r#"{"incremental":[{"label":"heroDetails","path":["hero"],"data":{"biography":"x"}}],"hasNext":false}"#,
            ),
            "--graphql--".to_string(),
        ]
        .concat();

        let results: Vec<_> = parser
            .parse_multipart(
                &headers(DEFER_CONTENT_TYPE),
                stream::iter(vec![Bytes::from(body)]),
                CancellationToken::new(),
            )
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0],
            Err(ResponseError::Protocol(
                ProtocolError::IncrementalWithoutPrior
            ))
        );
    }

    #[tokio::test]
    async fn unknown_defer_labels_are_rejected() {
        let parser = parser(deferred_hero_operation());
        let item = graphql::IncrementalResponse::builder()
            .label("noSuchLabel".to_string())
            .path(Path::from("hero"))
            .data(json!({ "biography": "x" }))
            .build();
        let result = parser.parse_incremental_item(&item).await;
        assert!(matches!(
            result,
            Err(ResponseError::Protocol(
                ProtocolError::UnknownDeferredFragment { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn subscription_stream_yields_one_result_per_event_and_skips_heartbeats() {
        let operation = Operation::new(
            OperationKind::Subscription,
            "Subscription",
            vec![Selection::field(Field::new("count", FieldType::Int))],
        );
        let parser = parser(operation);
        let body = [
            part("{}"),
            part(r#"{"payload":{"data":{"count":1}}}"#),
            part("{}"),
            part(r#"{"payload":{"data":{"count":2}}}"#),
            "--graphql--".to_string(),
        ]
        .concat();

        let results: Vec<_> = parser
            .parse_multipart(
                &headers(SUBSCRIPTION_CONTENT_TYPE),
                stream::iter(vec![Bytes::from(body)]),
                CancellationToken::new(),
            )
            .unwrap()
            .collect()
            .await;
        assert_eq!(results.len(), 2);
        let counts: Vec<_> = results
            .iter()
            .map(|result| {
                result
                    .as_ref()
                    .unwrap()
                    .response
                    .data
                    .as_ref()
                    .unwrap()
                    .to_json()
            })
            .collect();
        assert_eq!(counts, vec![json!({ "count": 1 }), json!({ "count": 2 })]);
    }

    #[tokio::test]
    async fn cancellation_aborts_before_applying_the_next_item() {
        let parser = parser(deferred_hero_operation());
        let token = CancellationToken::new();
        token.cancel();
        let body = [
            part(r#"{"data":{"hero":{"id":"2001","name":"R2-D2"}},"hasNext":true}"#),
            part(
                r#"{"incremental":[{"label":"heroDetails","path":["hero"],"data":{"biography":"x"}}],"hasNext":false}"#,
            ),
            "--graphql--".to_string(),
        ]
        .concat();

        let results: Vec<_> = parser
            .parse_multipart(
                &headers(DEFER_CONTENT_TYPE),
                stream::iter(vec![Bytes::from(body)]),
                token,
            )
            .unwrap()
            .collect()
            .await;
        // The primary result is parsed before cancellation is observed.
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(ResponseError::Cancelled));
    }

    #[tokio::test]
    async fn non_multipart_headers_are_rejected_by_the_multipart_entry_point() {
        let parser = parser(deferred_hero_operation());
        let result = parser.parse_multipart(
            &headers("application/json"),
            stream::iter(Vec::<Bytes>::new()),
            CancellationToken::new(),
        );
        assert!(matches!(
            result.err(),
            Some(ResponseError::Framing(FramingError::NotMultipart { .. }))
        ));
    }
}
