use serde_json::{Map, Value};

/// The unvalidated JSON object returned by the analysis service for one request.
///
/// Only object-shaped bodies can become a `RawPayload`; anything else is
/// rejected by the transport before normalization runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload(Map<String, Value>);

impl RawPayload {
    /// Wrap a JSON value, or `None` when it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// View the payload with the object under `nested` searched before the top level.
    ///
    /// A missing or non-object `nested` value leaves only the top level.
    pub fn scoped<'a>(&'a self, nested: &str) -> Scoped<'a> {
        Scoped {
            scopes: [
                self.0.get(nested).and_then(Value::as_object),
                Some(&self.0),
            ],
        }
    }
}

/// Lookup view over a [`RawPayload`], in scope priority order.
#[derive(Debug, Clone, Copy)]
pub struct Scoped<'a> {
    scopes: [Option<&'a Map<String, Value>>; 2],
}

impl<'a> Scoped<'a> {
    /// First value under `key`, across scopes, that `extract` accepts.
    ///
    /// A value of the wrong shape in one scope does not hide a usable value in
    /// the next.
    pub fn find<T>(&self, key: &str, extract: impl Fn(&'a Value) -> Option<T>) -> Option<T> {
        self.scopes
            .into_iter()
            .flatten()
            .filter_map(|scope| scope.get(key))
            .find_map(extract)
    }

    /// First object found under `key`.
    pub fn object(&self, key: &str) -> Option<&'a Map<String, Value>> {
        self.find(key, Value::as_object)
    }

    /// First array found under `key`.
    pub fn array(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.find(key, Value::as_array)
    }

    /// First non-empty array found under `key`; an empty one does not hide the next.
    pub fn non_empty_array(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.find(key, |value| value.as_array().filter(|list| !list.is_empty()))
    }

    /// First number found under `key`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.find(key, Value::as_f64)
    }

    /// First non-blank string found under `key`.
    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.find(key, non_blank)
    }
}

/// A string value with at least one non-whitespace character.
pub fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}
