// ── Lift: wire values to typed attribute trees ──
//
// Each record type implements `Lift` by walking its fields through an
// `ObjectLifter`, which looks every field up in the declared schema so
// that the disposition and null policy of the leaf decide what a JSON
// null becomes.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use nautobot_api::Field;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::attr::{AttributeValue, KnownValue};
use crate::diag::Diagnostic;
use crate::path::AttributePath;
use crate::schema::{AttrType, Attribute, NullPolicy, ObjectSchema};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LiftError {
    /// A `Required` attribute mapped from a JSON null or a missing key.
    #[error("required attribute {path} has no value")]
    NullRequired { path: AttributePath },

    /// The record carries a field the schema does not declare.
    #[error("attribute {path} is not declared in the schema")]
    Undeclared { path: AttributePath },

    /// The schema declares a different type than the lift produces.
    #[error("attribute {path} is declared as {declared:?}, cannot lift a {lifted} into it")]
    TypeMismatch {
        path: AttributePath,
        declared: AttrType,
        lifted: &'static str,
    },
}

impl LiftError {
    pub fn path(&self) -> &AttributePath {
        match self {
            Self::NullRequired { path }
            | Self::Undeclared { path }
            | Self::TypeMismatch { path, .. } => path,
        }
    }
}

impl From<LiftError> for Diagnostic {
    fn from(err: LiftError) -> Self {
        let path = err.path().clone();
        Diagnostic::attribute_error(path, "Failed to map upstream value", err.to_string())
    }
}

/// Conversion of a decoded record into a schema-conformant object.
pub trait Lift {
    fn lift(&self, schema: &ObjectSchema, path: &AttributePath)
    -> Result<AttributeValue, LiftError>;
}

// ── Dynamic JSON ────────────────────────────────────────────────────

/// Recursively lift an arbitrary JSON value.
///
/// Objects become `Map`s (their keys are data, not schema). Integers that
/// fit `i64` become `Int64`; every other number becomes `Float64`.
pub fn lift_json(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::bool(*b),
        Value::Number(n) => n.as_i64().map_or_else(
            || AttributeValue::Known(KnownValue::Float64(n.as_f64().unwrap_or(f64::NAN))),
            AttributeValue::int64,
        ),
        Value::String(s) => AttributeValue::string(s.clone()),
        Value::Array(items) => AttributeValue::list(items.iter().map(lift_json).collect()),
        Value::Object(entries) => AttributeValue::Known(KnownValue::Map(lift_json_entries(entries))),
    }
}

fn lift_json_entries(entries: &Map<String, Value>) -> BTreeMap<String, AttributeValue> {
    entries
        .iter()
        .map(|(k, v)| (k.clone(), lift_json(v)))
        .collect()
}

// ── ObjectLifter ────────────────────────────────────────────────────

/// Builds one `Object` node, field by field, against its schema.
pub struct ObjectLifter<'a> {
    schema: &'a ObjectSchema,
    path: &'a AttributePath,
    fields: IndexMap<String, AttributeValue>,
}

impl<'a> ObjectLifter<'a> {
    pub fn new(schema: &'a ObjectSchema, path: &'a AttributePath) -> Self {
        Self {
            schema,
            path,
            fields: IndexMap::with_capacity(schema.len()),
        }
    }

    fn declared(
        &self,
        name: &str,
        lifted: &'static str,
        accepts: fn(&AttrType) -> bool,
    ) -> Result<(&'a Attribute, AttributePath), LiftError> {
        let path = self.path.attribute(name);
        let Some(attribute) = self.schema.get(name) else {
            return Err(LiftError::Undeclared { path });
        };
        if !accepts(&attribute.ty) {
            return Err(LiftError::TypeMismatch {
                path,
                declared: attribute.ty.clone(),
                lifted,
            });
        }
        Ok((attribute, path))
    }

    /// Value to publish when upstream sent null (or nothing) for a leaf.
    fn missing(
        attribute: &Attribute,
        path: AttributePath,
        zero: AttributeValue,
    ) -> Result<AttributeValue, LiftError> {
        if attribute.disposition.is_required() {
            return Err(LiftError::NullRequired { path });
        }
        Ok(match attribute.null_policy {
            NullPolicy::Preserve => AttributeValue::Null,
            NullPolicy::ZeroValue => zero,
        })
    }

    /// Lift a string leaf. A missing key is treated like JSON null.
    pub fn string(mut self, name: &str, field: &Field<String>) -> Result<Self, LiftError> {
        let (attribute, path) =
            self.declared(name, "string", |ty| matches!(ty, AttrType::String))?;
        let value = match field {
            Field::Present(s) => AttributeValue::string(s.clone()),
            Field::Null | Field::Absent => {
                Self::missing(attribute, path, AttributeValue::string(""))?
            }
        };
        self.fields.insert(name.to_owned(), value);
        Ok(self)
    }

    /// Lift an integer leaf. A missing key defaults to `0`.
    pub fn int64(mut self, name: &str, field: &Field<i64>) -> Result<Self, LiftError> {
        let (attribute, path) = self.declared(name, "int64", |ty| matches!(ty, AttrType::Int64))?;
        let value = match field {
            Field::Present(n) => AttributeValue::int64(*n),
            Field::Absent => AttributeValue::int64(0),
            Field::Null => Self::missing(attribute, path, AttributeValue::int64(0))?,
        };
        self.fields.insert(name.to_owned(), value);
        Ok(self)
    }

    /// Lift a free-form JSON object into a `Map` leaf, recursively.
    pub fn json_map(
        mut self,
        name: &str,
        field: &Field<Map<String, Value>>,
    ) -> Result<Self, LiftError> {
        let (attribute, path) = self.declared(name, "map", |ty| {
            matches!(ty, AttrType::Dynamic) || matches!(ty, AttrType::Map(e) if **e == AttrType::Dynamic)
        })?;
        let value = match field {
            Field::Present(entries) => AttributeValue::Known(KnownValue::Map(lift_json_entries(entries))),
            Field::Null | Field::Absent => Self::missing(
                attribute,
                path,
                AttributeValue::Known(KnownValue::Map(BTreeMap::new())),
            )?,
        };
        self.fields.insert(name.to_owned(), value);
        Ok(self)
    }

    /// Finish the object. Declared attributes the record never set are
    /// filled in as if upstream had sent null for them.
    pub fn finish(mut self) -> Result<AttributeValue, LiftError> {
        for (name, attribute) in self.schema.iter() {
            if self.fields.contains_key(name) {
                continue;
            }
            let path = self.path.attribute(name);
            let value = Self::missing(attribute, path, AttributeValue::Null)?;
            self.fields.insert(name.clone(), value);
        }

        // Publish in declaration order regardless of lift order.
        let mut ordered = IndexMap::with_capacity(self.fields.len());
        for (name, _) in self.schema.iter() {
            if let Some(value) = self.fields.swap_remove(name) {
                ordered.insert(name.clone(), value);
            }
        }
        Ok(AttributeValue::object(ordered))
    }
}
