use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;

use crate::error::ProtocolError;
use crate::graphql::Error;
use crate::json_ext::Object;
use crate::json_ext::Path;

/// A GraphQL response as it appears on the wire.
///
/// A single-shot response carries only `data` / `errors` / `extensions`. A
/// multipart part additionally carries `hasNext`, and either `data`+`path`
/// (an initial or patch response) or a batch of [`IncrementalResponse`]s.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Response {
    /// The label that was passed to the defer directive for this patch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,

    /// The response data.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,

    /// The path that the data should be merged at.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<Path>,

    /// The optional graphql errors encountered.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<Error>,

    /// The optional graphql extensions.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub extensions: Object,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub has_next: Option<bool>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub incremental: Vec<IncrementalResponse>,
}

#[buildstructor::buildstructor]
impl Response {
    /// Constructor
    #[builder(visibility = "pub")]
    fn new(
        label: Option<String>,
        data: Option<Value>,
        path: Option<Path>,
        errors: Vec<Error>,
        extensions: Map<ByteString, Value>,
        has_next: Option<bool>,
        incremental: Vec<IncrementalResponse>,
    ) -> Self {
        Self {
            label,
            data,
            path,
            errors,
            extensions,
            has_next,
            incremental,
        }
    }

    /// If path is None, this is a primary response.
    pub fn is_primary(&self) -> bool {
        self.path.is_none()
    }

    /// Create a [`Response`] from the supplied [`Bytes`].
    ///
    /// This will return an error describing the malformation if the input is invalid.
    pub fn from_bytes(b: &Bytes) -> Result<Response, ProtocolError> {
        let value = Value::from_bytes(b.clone()).map_err(|error| {
            ProtocolError::MalformedResponse {
                reason: error.to_string(),
            }
        })?;
        Self::from_value(value)
    }

    /// Validate a decoded JSON [`Value`] against the GraphQL response envelope.
    pub fn from_value(value: Value) -> Result<Response, ProtocolError> {
        let malformed = |reason: String| ProtocolError::MalformedResponse { reason };

        let mut object = ensure_object!(value).map_err(|error| malformed(error.to_string()))?;

        let data = object.remove("data");
        let errors = extract_key_value_from_object!(object, "errors", Value::Array(v) => v)
            .map_err(|err| malformed(err.to_string()))?
            .into_iter()
            .flatten()
            .map(|v| Error::from_value(v).map_err(malformed))
            .collect::<Result<Vec<Error>, ProtocolError>>()?;
        let extensions =
            extract_key_value_from_object!(object, "extensions", Value::Object(o) => o)
                .map_err(|err| malformed(err.to_string()))?
                .unwrap_or_default();
        let label = extract_key_value_from_object!(object, "label", Value::String(s) => s)
            .map_err(|err| malformed(err.to_string()))?
            .map(|s| s.as_str().to_string());
        let path = extract_key_value_from_object!(object, "path")
            .map(serde_json_bytes::from_value)
            .transpose()
            .map_err(|err| malformed(err.to_string()))?;
        let has_next = extract_key_value_from_object!(object, "hasNext", Value::Bool(b) => b)
            .map_err(|err| malformed(err.to_string()))?;
        let incremental =
            extract_key_value_from_object!(object, "incremental", Value::Array(a) => a)
                .map_err(|err| malformed(err.to_string()))?;
        let incremental: Vec<IncrementalResponse> = match incremental {
            Some(v) => v
                .into_iter()
                .map(serde_json_bytes::from_value)
                .collect::<Result<Vec<IncrementalResponse>, _>>()
                .map_err(|err| malformed(err.to_string()))?,
            None => vec![],
        };
        // GraphQL spec says:
        // If the data entry in the response is not present, the errors entry in the response must not be empty.
        // It must contain at least one error. The errors it contains should indicate why no data was able to be returned.
        if data.is_none() && errors.is_empty() && incremental.is_empty() {
            return Err(malformed(
                "graphql response without data must contain at least one error".to_string(),
            ));
        }

        Ok(Response {
            label,
            data,
            path,
            errors,
            extensions,
            has_next,
            incremental,
        })
    }
}

/// A GraphQL incremental response, one entry of a multipart `incremental` batch.
/// Used with `@defer`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct IncrementalResponse {
    /// The label that was passed to the defer directive for this patch.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,

    /// The response data.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<Value>,

    /// The path that the data should be merged at.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub path: Option<Path>,

    /// The optional graphql errors encountered.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<Error>,

    /// The optional graphql extensions.
    #[serde(skip_serializing_if = "Object::is_empty", default)]
    pub extensions: Object,
}

#[buildstructor::buildstructor]
impl IncrementalResponse {
    /// Constructor
    #[builder(visibility = "pub")]
    fn new(
        label: Option<String>,
        data: Option<Value>,
        path: Option<Path>,
        errors: Vec<Error>,
        extensions: Map<ByteString, Value>,
    ) -> Self {
        Self {
            label,
            data,
            path,
            errors,
            extensions,
        }
    }
}
