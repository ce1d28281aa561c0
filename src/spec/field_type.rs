use serde::Deserialize;
use serde::Serialize;

// Primitives are taken from scalars: https://spec.graphql.org/draft/#sec-Scalars
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Named type {0}
    Named(String),
    /// List type {0}
    List(Box<FieldType>),
    /// Non null type {0}
    NonNull(Box<FieldType>),
    /// String
    String,
    /// Int
    Int,
    /// Float
    Float,
    /// Id
    Id,
    /// Boolean
    Boolean,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Named(ty) => write!(f, "{ty}"),
            FieldType::List(ty) => write!(f, "[{ty}]"),
            FieldType::NonNull(ty) => write!(f, "{ty}!"),
            FieldType::String => write!(f, "String"),
            FieldType::Int => write!(f, "Int"),
            FieldType::Float => write!(f, "Float"),
            FieldType::Id => write!(f, "ID"),
            FieldType::Boolean => write!(f, "Boolean"),
        }
    }
}

impl FieldType {
    pub fn is_non_null(&self) -> bool {
        matches!(self, FieldType::NonNull(_))
    }

    /// Strip one level of non-null wrapping, if any.
    pub fn nullable(&self) -> &FieldType {
        match self {
            FieldType::NonNull(inner) => inner,
            other => other,
        }
    }

    /// The innermost named type, seen through list and non-null wrappers.
    pub fn inner_named_type(&self) -> Option<&str> {
        match self {
            FieldType::Named(name) => Some(name),
            FieldType::List(inner) | FieldType::NonNull(inner) => inner.inner_named_type(),
            _ => None,
        }
    }

    /// Shorthand for `NonNull(inner)`.
    pub fn non_null(inner: FieldType) -> FieldType {
        FieldType::NonNull(Box::new(inner))
    }

    /// Shorthand for `List(inner)`.
    pub fn list(inner: FieldType) -> FieldType {
        FieldType::List(Box::new(inner))
    }

    /// Shorthand for `Named(name)`.
    pub fn named(name: impl Into<String>) -> FieldType {
        FieldType::Named(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_sdl() {
        let ty = FieldType::non_null(FieldType::list(FieldType::non_null(FieldType::named(
            "Droid",
        ))));
        assert_eq!(ty.to_string(), "[Droid!]!");
        assert!(ty.is_non_null());
        assert_eq!(ty.inner_named_type(), Some("Droid"));
        assert_eq!(ty.nullable().to_string(), "[Droid!]");
    }
}
