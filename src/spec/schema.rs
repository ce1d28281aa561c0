use std::collections::HashMap;
use std::collections::HashSet;

use crate::json_ext::Object;

/// Schema metadata supplied by the caller (usually generated code).
///
/// The executor consults this for abstract-type resolution (does a concrete
/// `__typename` satisfy a fragment's type condition), for custom scalar
/// detection, and for computing the cache key of a normalized object.
pub trait SchemaMetadata: Send + Sync {
    /// Returns true if `maybe_subtype` is a member or implementation of the
    /// abstract type `abstract_type`.
    fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool;

    /// Returns true for scalar types whose wire format this crate cannot
    /// validate and must pass through untouched.
    fn is_custom_scalar(&self, name: &str) -> bool;

    /// Compute the cache key for an object of type `type_name`, or `None`
    /// if objects of this type are not independently identifiable.
    fn cache_key(&self, type_name: &str, object: &Object) -> Option<String> {
        let _ = (type_name, object);
        None
    }
}

/// A map-backed [`SchemaMetadata`] implementation.
///
/// `subtype_map` maps each interface or union name to its members.
/// `key_fields` maps a type name to the field whose value identifies
/// objects of that type; the derived key is `Type:value`.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub subtype_map: HashMap<String, HashSet<String>>,
    pub custom_scalars: HashSet<String>,
    pub key_fields: HashMap<String, String>,
}

impl Schema {
    pub fn with_subtypes<I, S>(mut self, abstract_type: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subtype_map.insert(
            abstract_type.into(),
            members.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn with_custom_scalar(mut self, name: impl Into<String>) -> Self {
        self.custom_scalars.insert(name.into());
        self
    }

    pub fn with_key_field(mut self, type_name: impl Into<String>, field: impl Into<String>) -> Self {
        self.key_fields.insert(type_name.into(), field.into());
        self
    }
}

impl SchemaMetadata for Schema {
    fn is_subtype(&self, abstract_type: &str, maybe_subtype: &str) -> bool {
        self.subtype_map
            .get(abstract_type)
            .map(|members| members.contains(maybe_subtype))
            .unwrap_or(false)
    }

    fn is_custom_scalar(&self, name: &str) -> bool {
        self.custom_scalars.contains(name)
    }

    fn cache_key(&self, type_name: &str, object: &Object) -> Option<String> {
        let key_field = self.key_fields.get(type_name)?;
        let value = object.get(key_field.as_str())?;
        let id = value.as_str().map(|s| s.to_owned()).or_else(|| {
            value.as_i64().map(|i| i.to_string())
        })?;
        Some(format!("{type_name}:{id}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn subtype_and_cache_key_resolution() {
        let schema = Schema::default()
            .with_subtypes("Character", ["Human", "Droid"])
            .with_key_field("Droid", "id");

        assert!(schema.is_subtype("Character", "Droid"));
        assert!(!schema.is_subtype("Character", "Starship"));
        assert!(!schema.is_subtype("Droid", "Droid"));

        let object = json!({"id": "2001", "name": "R2-D2"});
        assert_eq!(
            schema.cache_key("Droid", object.as_object().unwrap()),
            Some("Droid:2001".to_string())
        );
        assert_eq!(schema.cache_key("Human", object.as_object().unwrap()), None);
    }
}
