//! The selection model consumed by the executor: field types, selection
//! trees, fragment definitions and schema metadata hooks.
//!
//! This crate does not parse GraphQL documents; selection trees are produced
//! by generated code (or built programmatically in tests) and consumed here.

mod field_type;
mod fragments;
mod schema;
mod selection;

use serde::Deserialize;
use serde::Serialize;

pub use field_type::FieldType;
pub use fragments::Fragment;
pub use fragments::Fragments;
pub use schema::Schema;
pub use schema::SchemaMetadata;
pub use selection::Field;
pub use selection::Selection;

pub(crate) const TYPENAME: &str = "__typename";

/// GraphQL operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl Default for OperationKind {
    fn default() -> Self {
        OperationKind::Query
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "Query"),
            OperationKind::Mutation => write!(f, "Mutation"),
            OperationKind::Subscription => write!(f, "Subscription"),
        }
    }
}

/// One executable operation: its kind, root type name and root selections.
#[derive(Debug, Clone)]
pub struct Operation {
    pub kind: OperationKind,
    /// The schema's root operation type, e.g. `Query`.
    pub type_name: String,
    pub selection_set: Vec<Selection>,
}

impl Operation {
    pub fn new(
        kind: OperationKind,
        type_name: impl Into<String>,
        selection_set: Vec<Selection>,
    ) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            selection_set,
        }
    }
}
