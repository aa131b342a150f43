//! Nested dataset values
//!
//! A dataset is one JSON document. It is converted once, on load, into a
//! tagged [`NestedValue`] so traversal never has to inspect JSON types again.

use serde_json::Value;

/// One loaded dataset: a scalar, an ordered list, or an ordered map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NestedValue {
    /// Leaf value, already stringified
    Scalar(String),
    /// Ordered sequence of values
    List(Vec<NestedValue>),
    /// Ordered key/value pairs; keys are unique and keep insertion order
    Map(Vec<(String, NestedValue)>),
}

impl NestedValue {
    /// Convenience constructor for scalar leaves
    pub fn scalar(value: impl Into<String>) -> Self {
        NestedValue::Scalar(value.into())
    }

    /// Build a map from `(key, value)` pairs
    ///
    /// A repeated key replaces the earlier value in place, matching how a
    /// JSON object with duplicate keys decodes.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, NestedValue)>,
    {
        let mut out: Vec<(String, NestedValue)> = Vec::new();
        for (key, value) in entries {
            let key = key.into();
            match out.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => out.push((key, value)),
            }
        }
        NestedValue::Map(out)
    }

    /// Build a list value
    pub fn list(items: impl IntoIterator<Item = NestedValue>) -> Self {
        NestedValue::List(items.into_iter().collect())
    }
}

impl From<Value> for NestedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => NestedValue::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, NestedValue::from(value)))
                    .collect(),
            ),
            Value::Array(items) => {
                NestedValue::List(items.into_iter().map(NestedValue::from).collect())
            }
            Value::String(s) => NestedValue::Scalar(s),
            // Numbers, booleans and null keep their JSON text form
            other => NestedValue::Scalar(other.to_string()),
        }
    }
}
