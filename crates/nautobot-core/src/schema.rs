// ── Attribute schemas ──
//
// Declarations the host uses to plan and diff, and the conformance check
// every lifted tree passes before it is published.

use indexmap::IndexMap;
use serde::Serialize;
use strum::Display;

use crate::attr::{AttributeValue, KnownValue};
use crate::diag::{Diagnostic, Diagnostics};
use crate::path::AttributePath;

// ── Types ───────────────────────────────────────────────────────────

/// Semantic type of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "element", rename_all = "snake_case")]
pub enum AttrType {
    String,
    Int64,
    Bool,
    /// Any JSON-shaped value; used for free-form bags such as custom fields.
    Dynamic,
    List(Box<AttrType>),
    Map(Box<AttrType>),
    Object(ObjectSchema),
}

impl AttrType {
    fn label(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int64 => "int64",
            Self::Bool => "bool",
            Self::Dynamic => "dynamic",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }
}

/// Who supplies an attribute's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Host must supply it; never null in published state.
    Required,
    /// Host may supply it.
    Optional,
    /// Produced by the provider.
    Computed,
    /// Host may supply it, otherwise the provider fills it in.
    OptionalComputed,
}

impl Disposition {
    pub fn is_required(self) -> bool {
        self == Self::Required
    }

    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::OptionalComputed)
    }

    pub fn is_computed(self) -> bool {
        matches!(self, Self::Computed | Self::OptionalComputed)
    }
}

/// What the lift does when upstream sends JSON null for a non-required leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPolicy {
    /// Publish `Null`.
    #[default]
    Preserve,
    /// Publish the type's zero value (`""`, `0`). For leaves the upstream
    /// always assigns, where a null means a malformed record rather than
    /// a deliberate absence.
    ZeroValue,
}

// ── Attribute ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub ty: AttrType,
    pub disposition: Disposition,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(skip)]
    pub null_policy: NullPolicy,
}

impl Attribute {
    pub fn new(ty: AttrType, disposition: Disposition) -> Self {
        Self {
            ty,
            disposition,
            description: String::new(),
            sensitive: false,
            null_policy: NullPolicy::default(),
        }
    }

    pub fn string(disposition: Disposition) -> Self {
        Self::new(AttrType::String, disposition)
    }

    pub fn int64(disposition: Disposition) -> Self {
        Self::new(AttrType::Int64, disposition)
    }

    pub fn map(element: AttrType, disposition: Disposition) -> Self {
        Self::new(AttrType::Map(Box::new(element)), disposition)
    }

    pub fn list_nested(object: ObjectSchema, disposition: Disposition) -> Self {
        Self::new(
            AttrType::List(Box::new(AttrType::Object(object))),
            disposition,
        )
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    #[must_use]
    pub fn with_null_policy(mut self, policy: NullPolicy) -> Self {
        self.null_policy = policy;
        self
    }

    /// Element object schema of a `List<Object>` attribute.
    pub fn nested_object(&self) -> Option<&ObjectSchema> {
        match &self.ty {
            AttrType::List(elem) => match elem.as_ref() {
                AttrType::Object(obj) => Some(obj),
                _ => None,
            },
            _ => None,
        }
    }
}

// ── ObjectSchema ────────────────────────────────────────────────────

/// Ordered set of named attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObjectSchema {
    attributes: IndexMap<String, Attribute>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Attribute> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

// ── Schema ──────────────────────────────────────────────────────────

/// Top-level schema of a provider, data source, or resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub attributes: ObjectSchema,
}

impl Schema {
    pub fn new(attributes: ObjectSchema) -> Self {
        Self {
            description: String::new(),
            attributes,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Check a state tree against this schema.
    ///
    /// Reports every violation, each as an error diagnostic carrying the
    /// offending path: unknown leaves, null required leaves, missing or
    /// undeclared attributes, and type mismatches.
    pub fn validate(&self, state: &AttributeValue) -> Diagnostics {
        let mut diags = Diagnostics::new();
        match state {
            AttributeValue::Known(KnownValue::Object(fields)) => {
                validate_object(&self.attributes, fields, &AttributePath::default(), &mut diags);
            }
            other => diags.push(Diagnostic::error(
                "Invalid state",
                format!("state root must be an object, got {}", describe(other)),
            )),
        }
        diags
    }
}

fn describe(value: &AttributeValue) -> &'static str {
    match value {
        AttributeValue::Null => "null",
        AttributeValue::Unknown => "unknown",
        AttributeValue::Known(v) => v.kind(),
    }
}

fn child(parent: &AttributePath, name: &str) -> AttributePath {
    if parent.is_empty() {
        AttributePath::root(name)
    } else {
        parent.attribute(name)
    }
}

fn validate_object(
    schema: &ObjectSchema,
    fields: &IndexMap<String, AttributeValue>,
    path: &AttributePath,
    diags: &mut Diagnostics,
) {
    for (name, attribute) in schema.iter() {
        let at = child(path, name);
        match fields.get(name) {
            None => diags.push(Diagnostic::attribute_error(
                at,
                "Missing attribute",
                format!("declared attribute {name:?} is absent from the state"),
            )),
            Some(AttributeValue::Null) if attribute.disposition.is_required() => {
                diags.push(Diagnostic::attribute_error(
                    at,
                    "Required attribute is null",
                    format!("{name:?} is required but upstream returned no value"),
                ));
            }
            Some(value) => validate_value(&attribute.ty, value, &at, diags),
        }
    }

    for name in fields.keys() {
        if schema.get(name).is_none() {
            diags.push(Diagnostic::attribute_error(
                child(path, name),
                "Undeclared attribute",
                format!("{name:?} is not part of the schema"),
            ));
        }
    }
}

fn validate_value(
    ty: &AttrType,
    value: &AttributeValue,
    path: &AttributePath,
    diags: &mut Diagnostics,
) {
    let known = match value {
        AttributeValue::Null => return,
        AttributeValue::Unknown => {
            diags.push(Diagnostic::attribute_error(
                path.clone(),
                "Unknown value in read result",
                "a read must resolve every value it publishes",
            ));
            return;
        }
        AttributeValue::Known(known) => known,
    };

    match (ty, known) {
        (AttrType::Dynamic, _)
        | (AttrType::String, KnownValue::String(_))
        | (AttrType::Int64, KnownValue::Int64(_))
        | (AttrType::Bool, KnownValue::Bool(_)) => {}
        (AttrType::List(elem), KnownValue::List(items)) => {
            for (i, item) in items.iter().enumerate() {
                validate_value(elem, item, &path.index(i), diags);
            }
        }
        (AttrType::Map(elem), KnownValue::Map(entries)) => {
            for (key, item) in entries {
                validate_value(elem, item, &path.key(key), diags);
            }
        }
        (AttrType::Object(obj), KnownValue::Object(fields)) => {
            validate_object(obj, fields, path, diags);
        }
        (expected, found) => diags.push(Diagnostic::attribute_error(
            path.clone(),
            "Attribute type mismatch",
            format!("expected {}, got {}", expected.label(), found.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn schema() -> Schema {
        Schema::new(ObjectSchema::new().with_attribute(
            "items",
            Attribute::list_nested(
                ObjectSchema::new()
                    .with_attribute("name", Attribute::string(Disposition::Required))
                    .with_attribute("count", Attribute::int64(Disposition::Computed))
                    .with_attribute(
                        "extra",
                        Attribute::map(AttrType::Dynamic, Disposition::OptionalComputed),
                    ),
                Disposition::Computed,
            ),
        ))
    }

    fn item(name: AttributeValue, count: AttributeValue) -> AttributeValue {
        let mut fields = IndexMap::new();
        fields.insert("name".to_owned(), name);
        fields.insert("count".to_owned(), count);
        fields.insert("extra".to_owned(), AttributeValue::Null);
        AttributeValue::object(fields)
    }

    fn state(items: Vec<AttributeValue>) -> AttributeValue {
        let mut root = IndexMap::new();
        root.insert("items".to_owned(), AttributeValue::list(items));
        AttributeValue::object(root)
    }

    #[test]
    fn conforming_state_has_no_diagnostics() {
        let s = state(vec![item(AttributeValue::string("a"), AttributeValue::Null)]);
        assert!(schema().validate(&s).is_empty());
    }

    #[test]
    fn null_required_leaf_reports_its_path() {
        let s = state(vec![
            item(AttributeValue::string("a"), AttributeValue::int64(1)),
            item(AttributeValue::Null, AttributeValue::int64(1)),
        ]);
        let diags = schema().validate(&s);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Required attribute is null");
        assert_eq!(
            diags[0].path.as_ref().map(ToString::to_string).as_deref(),
            Some("items[1].name")
        );
    }

    #[test]
    fn type_mismatch_and_unknown_are_reported() {
        let s = state(vec![item(
            AttributeValue::int64(5),
            AttributeValue::Unknown,
        )]);
        let summaries: Vec<_> = schema()
            .validate(&s)
            .iter()
            .map(|d| d.summary.clone())
            .collect();
        assert_eq!(
            summaries,
            vec!["Attribute type mismatch", "Unknown value in read result"]
        );
    }

    #[test]
    fn missing_and_undeclared_attributes() {
        let mut fields = IndexMap::new();
        fields.insert("bogus".to_owned(), AttributeValue::bool(true));
        let diags = schema().validate(&AttributeValue::object(fields));
        let summaries: Vec<_> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Missing attribute", "Undeclared attribute"]);
    }

    #[test]
    fn disposition_flags() {
        assert!(Disposition::OptionalComputed.is_optional());
        assert!(Disposition::OptionalComputed.is_computed());
        assert!(!Disposition::Computed.is_optional());
        assert!(Disposition::Required.is_required());
    }
}
