//! Wire types for the Nautobot REST API.
//!
//! Field names match the JSON bodies returned under `/api/`. Scalar
//! record fields use [`Field`] so that "key absent", "key present but
//! null", and "key present with a value" stay distinguishable all the way
//! up to the attribute lift.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use url::Url;

// ── Field ────────────────────────────────────────────────────────────

/// Presence-aware JSON field.
///
/// Combine with `#[serde(default)]` on the containing struct field:
/// a missing key becomes [`Field::Absent`], an explicit `null` becomes
/// [`Field::Null`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// The value, if one was sent.
    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(v) => Some(v),
            Self::Absent | Self::Null => None,
        }
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Self::Present(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.map_or(Self::Null, Self::Present))
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Present(v) => v.serialize(serializer),
            Self::Absent | Self::Null => serializer.serialize_none(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────

/// Paginated list wrapper returned by every Nautobot list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<Url>,
    #[serde(default)]
    pub previous: Option<Url>,
    pub results: Vec<T>,
}

impl<T> PageEnvelope<T> {
    /// `true` once upstream has no further page.
    pub fn is_last(&self) -> bool {
        self.next.is_none()
    }
}

// ── DCIM: manufacturers ──────────────────────────────────────────────

/// Manufacturer record, from `GET /api/dcim/manufacturers/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manufacturer {
    /// UUID string.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub id: Field<String>,
    /// RFC 3339 timestamp.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub created: Field<String>,
    /// RFC 3339 timestamp.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub last_updated: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub display: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub slug: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub description: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub url: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub notes_url: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub devicetype_count: Field<i64>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub inventoryitem_count: Field<i64>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub platform_count: Field<i64>,
    /// Free-form custom field bag, kept as opaque JSON.
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub custom_fields: Field<Map<String, Value>>,
}

/// Query filters for `GET /api/dcim/manufacturers/`. All optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListManufacturersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}
