//! Tolerant, typed read access over an untyped JSON tree.
//!
//! Every `value_as_*` accessor is total: a missing key or a value of the
//! wrong shape yields `None` (or the supplied default) instead of an error.
//! Call sites that require a specific shape check for it themselves and
//! raise a [`ManifestError::Format`](crate::core::errors::ManifestError).

use serde_json::{Map, Value};

/// Conversion from a JSON value into a concrete element type.
///
/// Used by [`JsonObject::value_as_array`] for element-wise coercion.
pub trait FromJsonValue<'a>: Sized {
    fn from_json_value(value: &'a Value) -> Option<Self>;
}

impl<'a> FromJsonValue<'a> for String {
    fn from_json_value(value: &'a Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<'a> FromJsonValue<'a> for &'a str {
    fn from_json_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

impl<'a> FromJsonValue<'a> for bool {
    fn from_json_value(value: &'a Value) -> Option<Self> {
        value.as_bool()
    }
}

impl<'a> FromJsonValue<'a> for JsonObject<'a> {
    fn from_json_value(value: &'a Value) -> Option<Self> {
        JsonObject::from_value(value)
    }
}

/// Read-only view over a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct JsonObject<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> JsonObject<'a> {
    /// Wrap an already-parsed JSON object.
    pub fn new(map: &'a Map<String, Value>) -> Self {
        JsonObject { map }
    }

    /// Wrap a value if it is an object.
    pub fn from_value(value: &'a Value) -> Option<Self> {
        value.as_object().map(JsonObject::new)
    }

    /// Keys in the order the underlying map yields them.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.map.keys().map(String::as_str)
    }

    /// Key/value pairs of this object.
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Raw value for a key. `None` means the key is missing.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// String value, or `None` if missing or not a string.
    pub fn value_as_string(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Boolean value, or `default` if missing or not a boolean.
    pub fn value_as_boolean(&self, key: &str, default: bool) -> bool {
        self.value_as_nullable_boolean(key).unwrap_or(default)
    }

    /// Boolean value, or `None` if missing or not a boolean.
    pub fn value_as_nullable_boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Nested object, or `None` if missing or not an object.
    pub fn value_as_json_object(&self, key: &str) -> Option<JsonObject<'a>> {
        self.get(key).and_then(JsonObject::from_value)
    }

    /// Array with each element coerced to `T`.
    ///
    /// Returns `None` if the value is missing or not an array. Elements that
    /// cannot be coerced are skipped.
    pub fn value_as_array<T: FromJsonValue<'a>>(&self, key: &str) -> Option<Vec<T>> {
        let items = self.get(key)?.as_array()?;
        Some(items.iter().filter_map(T::from_json_value).collect())
    }

    /// Array of strings; see [`value_as_array`](Self::value_as_array).
    pub fn value_as_string_array(&self, key: &str) -> Option<Vec<String>> {
        self.value_as_array::<String>(key)
    }

    /// Either a single string or an array of strings, flattened to a list.
    pub fn value_as_string_or_array(&self, key: &str) -> Option<Vec<String>> {
        string_or_array(self.get(key)?)
    }
}

/// Flatten a string or an array of strings into a list.
///
/// Returns `None` for any other shape (including arrays holding non-strings).
pub fn string_or_array(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}
