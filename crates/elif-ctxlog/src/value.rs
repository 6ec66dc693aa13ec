//! Field values attached to a context logger

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

/// Mapping of context field names to values
pub type Fields = HashMap<String, FieldValue>;

/// A single context field value.
///
/// Serializes untagged, so `{"n": FieldValue::Int(1)}` renders as `{"n":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Bool(bool),
    Map(Fields),
}

impl FieldValue {
    /// Borrow the value as a string slice if it holds text
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the nested map if this is a `Map` value
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            FieldValue::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// JSON rendering of the value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Map(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::String(value.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Fields> for FieldValue {
    fn from(value: Fields) -> Self {
        FieldValue::Map(value)
    }
}

/// Build a [`Fields`] map from key/value pairs.
///
/// ```rust
/// use elif_ctxlog::{fields, FieldValue};
///
/// let f = fields! { "user" => "alice", "attempt" => 3 };
/// assert_eq!(f["attempt"], FieldValue::Int(3));
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert(::std::string::String::from($key), $crate::FieldValue::from($value));
        )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_serializes_untagged() {
        let mut nested = Fields::new();
        nested.insert("request_id".to_string(), "r1".into());
        nested.insert("attempt".to_string(), 2.into());
        nested.insert("retry".to_string(), true.into());

        let value = FieldValue::Map(nested);
        assert_eq!(
            value.to_json(),
            json!({"request_id": "r1", "attempt": 2, "retry": true})
        );
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from("abc").to_string(), "abc");
        assert_eq!(FieldValue::from(42).to_string(), "42");
        assert_eq!(FieldValue::from(false).to_string(), "false");
    }

    #[test]
    fn test_fields_macro() {
        let f = fields! { "a" => 1, "b" => "two" };
        assert_eq!(f.len(), 2);
        assert_eq!(f["a"], FieldValue::Int(1));
        assert_eq!(f["b"].as_str(), Some("two"));

        let empty = fields! {};
        assert!(empty.is_empty());
    }
}
