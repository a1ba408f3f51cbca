//! Dynamically shaped alert documents.
//!
//! Alert documents come from the `_source` of a search hit and have no fixed
//! schema. They are kept as a map of field names to [`FieldValue`] so any field
//! can be looked up by its configured name and every field can be rendered as
//! a detail fact.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// A single value of an alert document field.
///
/// Variant order matters for untagged deserialization: `Object` comes last so
/// it only catches JSON objects.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    List(Vec<FieldValue>),
    Object(serde_json::Map<String, serde_json::Value>),
}

impl fmt::Display for FieldValue {
    /// Renders the value as plain text.
    ///
    /// `Null` renders as an empty string, lists are joined with `,` and
    /// objects are rendered as compact JSON.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::List(items) => {
                let joined: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                f.write_str(&joined.join(","))
            }
            FieldValue::Object(map) => {
                // Serializing a Map of Values cannot fail
                let json = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// An alert document as returned by the search backend.
///
/// Fields are iterated in ascending key order.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct AlertDocument(BTreeMap<String, FieldValue>);

impl AlertDocument {
    /// Returns the raw value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Returns the value of `field` as text. Absent fields render as `""`.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(|v| v.to_string()).unwrap_or_default()
    }

    /// Iterates over all fields as `(name, rendered value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, String)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.to_string()))
    }
}

impl fmt::Display for AlertDocument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pairs: Vec<String> = self.fields().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AlertDocument {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_deserialize_mixed_values() {
        let doc = parse(
            r#"{"event": "fired", "count": 5, "ratio": 1.5, "ok": true, "none": null,
                "tags": ["a", "b"], "ctx": {"host": "web-1"}}"#,
        );

        assert_eq!(doc.fields().count(), 7);
        assert_eq!(doc.get("event"), Some(&FieldValue::Text("fired".to_owned())));
        assert!(matches!(doc.get("count"), Some(FieldValue::Number(_))));
        assert!(matches!(doc.get("ok"), Some(FieldValue::Bool(true))));
        assert!(matches!(doc.get("none"), Some(FieldValue::Null)));
        assert!(matches!(doc.get("tags"), Some(FieldValue::List(_))));
        assert!(matches!(doc.get("ctx"), Some(FieldValue::Object(_))));
    }

    #[test]
    fn test_text_rendering() {
        let doc = parse(
            r#"{"count": 5, "ratio": 1.5, "ok": false, "none": null,
                "tags": ["a", "b", 3], "ctx": {"host": "web-1"}}"#,
        );

        assert_eq!(doc.text("count"), "5");
        assert_eq!(doc.text("ratio"), "1.5");
        assert_eq!(doc.text("ok"), "false");
        assert_eq!(doc.text("none"), "");
        assert_eq!(doc.text("tags"), "a,b,3");
        assert_eq!(doc.text("ctx"), r#"{"host":"web-1"}"#);
        assert_eq!(doc.text("missing"), "");
    }

    #[test]
    fn test_fields_are_sorted_by_key() {
        let doc = parse(r#"{"b": "2", "a": "1", "c": "3"}"#);
        let keys: Vec<&str> = doc.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_display() {
        let doc = parse(r#"{"event": "fired", "count": 2}"#);
        assert_eq!(doc.to_string(), "{count=2, event=fired}");
    }
}
