//! Data layer errors.
//!
//! Every hard failure a public entry point can return is one of the
//! taxonomy kinds below, carrying enough context (path, label, content-type
//! value) to render an actionable message. Field-scoped problems that do
//! *not* abort a whole parse are instead surfaced as [`graphql::Error`]
//! values alongside partial data.

use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

use crate::cache::CacheReference;
use crate::graphql;
use crate::graphql::ErrorExtension;
use crate::json_ext::Path;

/// Errors raised while executing a selection set against a data source.
///
/// Decode errors are scoped to the response path of the originating field so
/// that multiple independent failures in one tree can be distinguished.
#[derive(Error, Display, Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum ExecutionError {
    /// missing value for required field at {path}
    MissingValue {
        /// Response path of the field with no value.
        path: Path,
    },

    /// invalid value for field at {path}: expected {expected}
    TypeMismatch {
        /// Response path of the mismatched value.
        path: Path,
        /// The shape the selection expected.
        expected: String,
    },

    /// cannot convert scalar value at {path}: {reason}
    InvalidScalar {
        /// Response path of the unconvertible value.
        path: Path,
        /// Why the conversion failed.
        reason: String,
    },

    /// cache reference at {path} was resolved outside of an active read transaction
    NotWithinReadTransaction {
        /// Response path of the field whose resolution required the cache.
        path: Path,
    },

    /// no record found for cache reference '{reference}' at {path}
    DanglingReference {
        /// The reference that could not be loaded.
        reference: CacheReference,
        /// Response path of the field holding the reference.
        path: Path,
    },
}

impl ExecutionError {
    pub(crate) fn path(&self) -> &Path {
        match self {
            ExecutionError::MissingValue { path }
            | ExecutionError::TypeMismatch { path, .. }
            | ExecutionError::InvalidScalar { path, .. }
            | ExecutionError::NotWithinReadTransaction { path }
            | ExecutionError::DanglingReference { path, .. } => path,
        }
    }

    /// Convert the execution error to a GraphQL error attached to its path.
    pub(crate) fn to_graphql_error(&self) -> graphql::Error {
        graphql::Error::builder()
            .message(self.to_string())
            .path(self.path().clone())
            .extension_code(self.extension_code())
            .build()
    }
}

impl ErrorExtension for ExecutionError {}

/// Errors raised while merging an incremental payload into a prior result.
///
/// The merge path must reference data shaped by the original execution, and
/// the two payloads must agree wherever they overlap; either violation
/// aborts the single incremental item that produced it, leaving the
/// previously merged result untouched.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum MergeError {
    /// incremental payload disagrees with previously merged value for field '{key}' at {path}
    ConflictingFieldValue {
        /// Path of the object both payloads describe.
        path: Path,
        /// The doubly-defined field.
        key: String,
    },

    /// merge path references unknown field '{key}' at {path}
    UnknownField {
        /// Path walked so far.
        path: Path,
        /// The field component that did not exist.
        key: String,
    },

    /// merge path index {index} is out of bounds at {path}
    IndexOutOfBounds {
        /// Path walked so far.
        path: Path,
        /// The offending list offset.
        index: usize,
    },

    /// expected {expected} at {path} while walking merge path
    InvalidPathShape {
        /// Path walked so far.
        path: Path,
        /// What the path component required the node to be.
        expected: &'static str,
    },
}

impl ErrorExtension for MergeError {}

/// Errors raised while classifying multipart chunk content.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum ProtocolError {
    /// unsupported content type in multipart chunk: '{content_type}'
    UnsupportedChunkContentType {
        /// The offending content-type directive.
        content_type: String,
    },

    /// malformed multipart chunk: {reason}
    MalformedChunk {
        /// Why the chunk could not be parsed.
        reason: String,
    },

    /// response was malformed: {reason}
    MalformedResponse {
        /// Why the envelope could not be parsed.
        reason: String,
    },

    /// server reported an irrecoverable subscription error
    IrrecoverableServerError {
        /// The errors carried by the transport-level message.
        errors: Vec<graphql::Error>,
    },

    /// no deferred fragment matches label {label:?} at {path}
    UnknownDeferredFragment {
        /// The label of the incremental item.
        label: Option<String>,
        /// The path of the incremental item.
        path: Path,
    },

    /// received an incremental payload without a prior response to merge into
    IncrementalWithoutPrior,
}

impl ErrorExtension for ProtocolError {}

/// Errors raised while framing the multipart byte stream.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum FramingError {
    /// content type '{content_type}' is not a multipart media type
    NotMultipart {
        /// The response's content-type header value.
        content_type: String,
    },

    /// multipart content type is missing its boundary parameter
    MissingBoundary,

    /// unrecognized multipart sub-protocol: '{protocol}'
    UnknownSubProtocol {
        /// The `Spec=` directive that was not recognized.
        protocol: String,
    },

    /// missing or invalid content-type header
    InvalidContentType,
}

impl ErrorExtension for FramingError {}

/// The failure type of the public parsing entry points.
#[derive(Error, Display, Debug, Clone, Eq, PartialEq)]
pub enum ResponseError {
    /// {0}
    Execution(#[from] ExecutionError),

    /// {0}
    Merge(#[from] MergeError),

    /// {0}
    Protocol(#[from] ProtocolError),

    /// {0}
    Framing(#[from] FramingError),

    /// response parsing was cancelled
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_error_carries_its_path() {
        let error = ExecutionError::NotWithinReadTransaction {
            path: Path::from("hero/friends/2"),
        };
        let gql = error.to_graphql_error();
        assert_eq!(gql.path, Some(Path::from("hero/friends/2")));
        assert_eq!(
            gql.extensions.get("code").and_then(|c| c.as_str()),
            Some("NOT_WITHIN_READ_TRANSACTION")
        );
        assert!(gql.message.contains("read transaction"));
    }
}
