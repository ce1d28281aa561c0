//! JSON path manipulation for response data.

use std::fmt;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
use serde_json_bytes::Value;

/// A JSON object.
pub type Object = Map<ByteString, Value>;

/// Extract the value for a key from a JSON object, matching it against an
/// expected [`Value`] variant. Absent keys and explicit nulls both yield
/// `Ok(None)`; a present value of the wrong shape yields `Err` with the
/// offending key name.
macro_rules! extract_key_value_from_object {
    ($object:expr, $key:literal, $pattern:pat => $var:expr) => {{
        match $object.remove($key) {
            Some(serde_json_bytes::Value::Null) | None => Ok(None),
            Some($pattern) => Ok(Some($var)),
            _ => Err(concat!("invalid type for key: ", $key)),
        }
    }};
    ($object:expr, $key:literal) => {{
        match $object.remove($key) {
            Some(serde_json_bytes::Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }};
}

/// Assert that a [`Value`] is an object and extract its map.
macro_rules! ensure_object {
    ($value:expr) => {{
        match $value {
            serde_json_bytes::Value::Object(o) => Ok(o),
            _ => Err("invalid type, expected an object"),
        }
    }};
}

/// One component of a [`Path`] into response data.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PathElement {
    /// The name of a field (or its response alias).
    Key(String),
    /// An offset into a list.
    Index(usize),
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathElement::Key(key) => write!(f, "{key}"),
            PathElement::Index(index) => write!(f, "{index}"),
        }
    }
}

impl Serialize for PathElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PathElement::Key(key) => serializer.serialize_str(key),
            PathElement::Index(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

impl<'de> Deserialize<'de> for PathElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(PathElement::Key(s.as_str().to_owned())),
            Value::Number(n) => n
                .as_u64()
                .map(|i| PathElement::Index(i as usize))
                .ok_or_else(|| de::Error::custom("path index must be a non-negative integer")),
            _ => Err(de::Error::custom(
                "a path element must be a string or an integer",
            )),
        }
    }
}

/// A path into the result data, as found in the `path` property of GraphQL
/// errors and incremental payloads. Serialized as a JSON array mixing field
/// names and list indices, e.g. `["hero", "friends", 2, "name"]`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Path(pub Vec<PathElement>);

impl Path {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, element: PathElement) {
        self.0.push(element);
    }

    pub fn pop(&mut self) -> Option<PathElement> {
        self.0.pop()
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathElement> {
        self.0.iter()
    }

    /// A copy of this path with one more element at the end.
    pub fn join(&self, element: PathElement) -> Self {
        let mut joined = self.clone();
        joined.push(element);
        joined
    }
}

impl<T: AsRef<str>> From<T> for Path {
    fn from(s: T) -> Self {
        Self(
            s.as_ref()
                .split('/')
                .filter(|part| !part.is_empty())
                .map(|part| {
                    if let Ok(index) = part.parse::<usize>() {
                        PathElement::Index(index)
                    } else {
                        PathElement::Key(part.to_owned())
                    }
                })
                .collect(),
        )
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<I: IntoIterator<Item = PathElement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.0 {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}
