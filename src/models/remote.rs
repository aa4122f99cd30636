//! Typed access to the untyped service configs returned by the API.
//!
//! Service configs (`services.identity.config`, `services.permission.config`)
//! are free-form JSON objects on the wire. [`Lens`] walks them while keeping
//! track of the key path, so a type mismatch is reported as a
//! [`DecodeError`] naming the offending key instead of a panic.
//! [`RemoteObject`] builds the outgoing objects and drops attributes that
//! should be left at the server default.

use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::types::AttrValue;

/// A remote payload had an unexpected JSON type at `path`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected value at `{path}`: expected {expected}, found {found}")]
pub struct DecodeError {
    /// Dotted key path, with `[n]` for list items.
    pub path: String,
    /// The JSON type that was expected.
    pub expected: &'static str,
    /// The JSON type that was found.
    pub found: &'static str,
}

impl DecodeError {
    /// Create an error for the value found at `path`.
    pub fn new(path: impl Into<String>, expected: &'static str, found: &Json) -> Self {
        Self {
            path: path.into(),
            expected,
            found: json_type_name(found),
        }
    }

    fn missing(path: impl Into<String>, expected: &'static str) -> Self {
        Self {
            path: path.into(),
            expected,
            found: "nothing",
        }
    }

    /// Prefix the path, used when a nested decoder reports relative paths.
    pub fn within(mut self, prefix: &str) -> Self {
        self.path = join_path(prefix, &self.path);
        self
    }
}

pub(crate) fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn join_path(base: &str, key: &str) -> String {
    match (base.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (_, true) => base.to_string(),
        _ if key.starts_with('[') => format!("{}{}", base, key),
        _ => format!("{}.{}", base, key),
    }
}

/// A position inside a remote JSON document.
///
/// `null` and missing keys are both treated as absent.
#[derive(Debug, Clone)]
pub struct Lens<'a> {
    path: String,
    value: Option<&'a Json>,
}

impl<'a> Lens<'a> {
    /// Start at the root of a document.
    pub fn root(value: &'a Json) -> Self {
        Self {
            path: String::new(),
            value: Some(value).filter(|v| !v.is_null()),
        }
    }

    /// The key path of this position.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns true if nothing is stored here.
    pub fn is_absent(&self) -> bool {
        self.value.is_none()
    }

    /// Step into `key`. Fails if the current value is not an object.
    pub fn get(&self, key: &str) -> Result<Lens<'a>, DecodeError> {
        let path = join_path(&self.path, key);
        let value = match self.value {
            None => None,
            Some(Json::Object(map)) => map.get(key).filter(|v| !v.is_null()),
            Some(other) => return Err(DecodeError::new(self.path.clone(), "object", other)),
        };
        Ok(Lens { path, value })
    }

    /// An optional string; absent becomes null.
    pub fn string(&self) -> Result<AttrValue<String>, DecodeError> {
        match self.value {
            None => Ok(AttrValue::Null),
            Some(Json::String(s)) => Ok(AttrValue::known(s.clone())),
            Some(other) => Err(DecodeError::new(self.path.clone(), "string", other)),
        }
    }

    /// A required string.
    pub fn require_string(&self) -> Result<String, DecodeError> {
        self.string()?
            .into_known()
            .ok_or_else(|| DecodeError::missing(self.path.clone(), "string"))
    }

    /// A boolean flag; absent becomes `false`.
    pub fn flag(&self) -> Result<AttrValue<bool>, DecodeError> {
        match self.value {
            None => Ok(AttrValue::known(false)),
            Some(Json::Bool(b)) => Ok(AttrValue::known(*b)),
            Some(other) => Err(DecodeError::new(self.path.clone(), "bool", other)),
        }
    }

    /// An optional integer; absent becomes null.
    ///
    /// Floats are accepted only when they have no fractional part.
    pub fn int(&self) -> Result<AttrValue<i64>, DecodeError> {
        let Some(value) = self.value else {
            return Ok(AttrValue::Null);
        };
        let number = value
            .as_i64()
            .or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| DecodeError::new(self.path.clone(), "integer", value))?;
        Ok(AttrValue::known(number))
    }

    /// A required integer.
    pub fn require_int(&self) -> Result<i64, DecodeError> {
        self.int()?
            .into_known()
            .ok_or_else(|| DecodeError::missing(self.path.clone(), "integer"))
    }

    /// The items of a list; absent becomes an empty list.
    pub fn items(&self) -> Result<Vec<Lens<'a>>, DecodeError> {
        match self.value {
            None => Ok(Vec::new()),
            Some(Json::Array(items)) => Ok(items
                .iter()
                .enumerate()
                .map(|(i, item)| Lens {
                    path: join_path(&self.path, &format!("[{}]", i)),
                    value: Some(item).filter(|v| !v.is_null()),
                })
                .collect()),
            Some(other) => Err(DecodeError::new(self.path.clone(), "array", other)),
        }
    }

    /// A list of strings; absent becomes an empty list.
    pub fn strings(&self) -> Result<AttrValue<Vec<String>>, DecodeError> {
        self.items()?
            .iter()
            .map(Lens::require_string)
            .collect::<Result<Vec<_>, _>>()
            .map(AttrValue::known)
    }

    /// The keys of an object, sorted; absent becomes an empty list.
    pub fn keys(&self) -> Result<AttrValue<Vec<String>>, DecodeError> {
        match self.value {
            None => Ok(AttrValue::known(Vec::new())),
            Some(Json::Object(map)) => {
                let mut keys: Vec<String> = map.keys().cloned().collect();
                keys.sort();
                Ok(AttrValue::known(keys))
            }
            Some(other) => Err(DecodeError::new(self.path.clone(), "object", other)),
        }
    }

    /// A free-form object, copied as is; absent becomes an empty object.
    pub fn raw_object(&self) -> Result<Map<String, Json>, DecodeError> {
        match self.value {
            None => Ok(Map::new()),
            Some(Json::Object(map)) => Ok(map.clone()),
            Some(other) => Err(DecodeError::new(self.path.clone(), "object", other)),
        }
    }

    /// A nested object; absent becomes the zero value of `T`.
    pub fn object<T: FromRemote>(&self) -> Result<AttrValue<T>, DecodeError> {
        if let Some(other) = self.value.filter(|v| !v.is_object()) {
            return Err(DecodeError::new(self.path.clone(), "object", other));
        }
        T::from_remote(self).map(AttrValue::known)
    }

    /// A list of nested objects; absent becomes an empty list.
    pub fn objects<T: FromRemote>(&self) -> Result<AttrValue<Vec<T>>, DecodeError> {
        self.items()?
            .iter()
            .map(|item| match item.value {
                Some(v) if !v.is_object() => Err(DecodeError::new(item.path.clone(), "object", v)),
                _ => T::from_remote(item),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(AttrValue::known)
    }
}

/// Decode a declarative model from a remote JSON object.
pub trait FromRemote: Sized {
    /// Read `Self` from the object at `lens`.
    fn from_remote(lens: &Lens<'_>) -> Result<Self, DecodeError>;
}

/// Encode a declarative model into a remote JSON object.
pub trait ToRemote {
    /// Build the remote object for `self`.
    fn to_remote(&self) -> Map<String, Json>;
}

/// Builder for outgoing objects.
///
/// Null and unknown attributes are omitted, as are empty strings, so the
/// server keeps its default for them. Flags are always sent.
#[derive(Debug, Default)]
pub struct RemoteObject {
    map: Map<String, Json>,
}

impl RemoteObject {
    /// Start an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string unless it is null, unknown or empty.
    pub fn string(mut self, key: &str, value: &AttrValue<String>) -> Self {
        if let Some(s) = value.as_known().filter(|s| !s.is_empty()) {
            self.map.insert(key.to_string(), Json::String(s.clone()));
        }
        self
    }

    /// Add an integer unless it is null or unknown.
    pub fn int(mut self, key: &str, value: &AttrValue<i64>) -> Self {
        if let Some(n) = value.as_known() {
            self.map.insert(key.to_string(), Json::from(*n));
        }
        self
    }

    /// Add a flag, sending `false` when null or unknown.
    pub fn flag(mut self, key: &str, value: &AttrValue<bool>) -> Self {
        self.map
            .insert(key.to_string(), Json::Bool(value.known_or(false)));
        self
    }

    /// Add a string list unless it is null or unknown.
    pub fn strings(mut self, key: &str, value: &AttrValue<Vec<String>>) -> Self {
        if let Some(items) = value.as_known() {
            self.map.insert(
                key.to_string(),
                Json::Array(items.iter().cloned().map(Json::String).collect()),
            );
        }
        self
    }

    /// Add a nested object unless it is null or unknown.
    pub fn object<T: ToRemote>(mut self, key: &str, value: &AttrValue<T>) -> Self {
        if let Some(inner) = value.as_known() {
            self.map
                .insert(key.to_string(), Json::Object(inner.to_remote()));
        }
        self
    }

    /// Add a list of nested objects unless it is null or unknown.
    pub fn objects<T: ToRemote>(mut self, key: &str, value: &AttrValue<Vec<T>>) -> Self {
        if let Some(items) = value.as_known() {
            self.map.insert(
                key.to_string(),
                Json::Array(
                    items
                        .iter()
                        .map(|item| Json::Object(item.to_remote()))
                        .collect(),
                ),
            );
        }
        self
    }

    /// Add a raw JSON value.
    pub fn raw(mut self, key: &str, value: Json) -> Self {
        self.map.insert(key.to_string(), value);
        self
    }

    /// Finish the object.
    pub fn build(self) -> Map<String, Json> {
        self.map
    }
}
