use serde_json_bytes::ByteString;

use crate::spec::FieldType;

/// One node of a selection-set tree.
///
/// Deferred inline fragments and fragment spreads carry a `defer_label`;
/// those sub-trees are never executed during the initial traversal, only
/// recorded so the result knows which labeled fragments remain outstanding.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Field(Field),
    InlineFragment {
        // GraphQL allows omitting the type condition; callers fill in the
        // enclosing type when building one without it
        type_condition: String,
        defer_label: Option<String>,
        selection_set: Vec<Selection>,
    },
    FragmentSpread {
        name: String,
        defer_label: Option<String>,
    },
}

impl Selection {
    pub fn field(field: Field) -> Self {
        Selection::Field(field)
    }

    pub fn inline_fragment(type_condition: impl Into<String>, selection_set: Vec<Selection>) -> Self {
        Selection::InlineFragment {
            type_condition: type_condition.into(),
            defer_label: None,
            selection_set,
        }
    }

    pub fn deferred_inline_fragment(
        type_condition: impl Into<String>,
        label: impl Into<String>,
        selection_set: Vec<Selection>,
    ) -> Self {
        Selection::InlineFragment {
            type_condition: type_condition.into(),
            defer_label: Some(label.into()),
            selection_set,
        }
    }

    pub fn fragment_spread(name: impl Into<String>) -> Self {
        Selection::FragmentSpread {
            name: name.into(),
            defer_label: None,
        }
    }

    pub fn deferred_fragment_spread(name: impl Into<String>, label: impl Into<String>) -> Self {
        Selection::FragmentSpread {
            name: name.into(),
            defer_label: Some(label.into()),
        }
    }
}

/// A field selection: its schema name, optional response alias, declared
/// type and, for composite types, its own selection set.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: ByteString,
    pub alias: Option<ByteString>,
    pub field_type: FieldType,
    pub selection_set: Option<Vec<Selection>>,
}

impl Field {
    pub fn new(name: impl Into<ByteString>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            alias: None,
            field_type,
            selection_set: None,
        }
    }

    pub fn aliased(mut self, alias: impl Into<ByteString>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_selections(mut self, selection_set: Vec<Selection>) -> Self {
        self.selection_set = Some(selection_set);
        self
    }

    /// The key this field occupies in the response object: the alias if one
    /// was given, the field name otherwise.
    pub fn response_key(&self) -> &ByteString {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    /// The key this field occupies in a cache record. Always the schema
    /// name: two aliases of the same field share one stored value.
    pub fn storage_key(&self) -> &ByteString {
        &self.name
    }
}
