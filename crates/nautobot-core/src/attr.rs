// ── Three-state attribute values ──
//
// The host distinguishes "explicitly null" from "not yet known" from a
// concrete value. Every leaf in a published tree carries one of the three.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// A host attribute in one of its three states.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr<T> {
    /// Explicitly absent.
    Null,
    /// Not yet computed by the host (only legal in configuration input).
    Unknown,
    Known(T),
}

impl<T> Attr<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Null | Self::Unknown => None,
        }
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

/// Published state serializes `Null` and `Unknown` alike as JSON `null`;
/// a read never publishes `Unknown`, so nothing is lost in practice.
impl<T: Serialize> Serialize for Attr<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => v.serialize(serializer),
            Self::Null | Self::Unknown => serializer.serialize_none(),
        }
    }
}

// ── KnownValue ──────────────────────────────────────────────────────

/// Payload of a known attribute.
///
/// `Object` keeps schema declaration order; `Map` is keyed by free-form
/// strings and kept sorted so repeated reads serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KnownValue {
    String(String),
    Int64(i64),
    /// Only produced for dynamic JSON numbers outside the `i64` range.
    Float64(f64),
    Bool(bool),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
    Object(IndexMap<String, AttributeValue>),
}

impl KnownValue {
    /// Short type label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Int64(_) => "int64",
            Self::Float64(_) => "float64",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }
}

/// Any node of a typed attribute tree.
pub type AttributeValue = Attr<KnownValue>;

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Known(KnownValue::String(value.into()))
    }

    pub fn int64(value: i64) -> Self {
        Self::Known(KnownValue::Int64(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::Known(KnownValue::Bool(value))
    }

    pub fn list(items: Vec<AttributeValue>) -> Self {
        Self::Known(KnownValue::List(items))
    }

    pub fn object(fields: IndexMap<String, AttributeValue>) -> Self {
        Self::Known(KnownValue::Object(fields))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Known(KnownValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Known(KnownValue::Int64(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            Self::Known(KnownValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Field of an `Object` node, or entry of a `Map` node.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        match self {
            Self::Known(KnownValue::Object(fields)) => fields.get(name),
            Self::Known(KnownValue::Map(entries)) => entries.get(name),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn option_maps_to_null_or_known() {
        assert_eq!(Attr::<i64>::from(None), Attr::Null);
        assert_eq!(Attr::from(Some(3)), Attr::Known(3));
    }

    #[test]
    fn accessors_only_match_known() {
        assert!(Attr::<String>::Unknown.known().is_none());
        assert!(Attr::<String>::Null.into_known().is_none());
        assert_eq!(AttributeValue::string("x").as_str(), Some("x"));
        assert_eq!(AttributeValue::Null.as_str(), None);
        assert_eq!(AttributeValue::int64(7).as_i64(), Some(7));
    }

    #[test]
    fn serializes_to_plain_json() {
        let mut fields = IndexMap::new();
        fields.insert("name".to_owned(), AttributeValue::string("Acme"));
        fields.insert("display".to_owned(), AttributeValue::Null);
        fields.insert("count".to_owned(), AttributeValue::int64(2));
        let tree = AttributeValue::list(vec![AttributeValue::object(fields)]);

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!([{ "name": "Acme", "display": null, "count": 2 }])
        );
    }

    #[test]
    fn object_keeps_declaration_order() {
        let mut fields = IndexMap::new();
        fields.insert("z".to_owned(), AttributeValue::bool(true));
        fields.insert("a".to_owned(), AttributeValue::bool(false));
        let text = serde_json::to_string(&AttributeValue::object(fields)).unwrap();
        assert_eq!(text, r#"{"z":true,"a":false}"#);
    }
}
