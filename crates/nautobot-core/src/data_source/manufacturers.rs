use std::sync::Arc;

use async_trait::async_trait;
use nautobot_api::{HttpResponse, ListManufacturersParams, Manufacturer, NautobotClient};

use super::{DataSource, unconfigured};
use crate::attr::AttributeValue;
use crate::client::ApiClient;
use crate::lift::{Lift, LiftError, ObjectLifter};
use crate::path::AttributePath;
use crate::read::{Listing, ReadRequest, ReadResponse, read_list};
use crate::schema::{AttrType, Attribute, Disposition, NullPolicy, ObjectSchema, Schema};

/// `GET /api/dcim/manufacturers/` bound to the `manufacturers` attribute.
pub struct ManufacturerListing;

impl Listing for ManufacturerListing {
    type Record = Manufacturer;

    const ATTRIBUTE: &'static str = "manufacturers";
    const NOUN: &'static str = "manufacturers";

    async fn first_page(
        client: &NautobotClient,
        limit: Option<u32>,
    ) -> Result<HttpResponse, nautobot_api::Error> {
        let params = ListManufacturersParams {
            limit,
            ..ListManufacturersParams::default()
        };
        client.list_manufacturers_raw(&params).await
    }
}

impl Lift for Manufacturer {
    fn lift(
        &self,
        schema: &ObjectSchema,
        path: &AttributePath,
    ) -> Result<AttributeValue, LiftError> {
        ObjectLifter::new(schema, path)
            .string("id", &self.id)?
            .string("created", &self.created)?
            .string("last_updated", &self.last_updated)?
            .string("display", &self.display)?
            .string("name", &self.name)?
            .string("slug", &self.slug)?
            .string("description", &self.description)?
            .string("notes_url", &self.notes_url)?
            .string("url", &self.url)?
            .int64("devicetype_count", &self.devicetype_count)?
            .int64("inventoryitem_count", &self.inventoryitem_count)?
            .int64("platform_count", &self.platform_count)?
            .json_map("custom_fields", &self.custom_fields)?
            .finish()
    }
}

fn manufacturer_schema() -> ObjectSchema {
    let server_assigned = |description: &str| {
        Attribute::string(Disposition::Computed)
            .with_description(description)
            .with_null_policy(NullPolicy::ZeroValue)
    };

    ObjectSchema::new()
        .with_attribute("id", server_assigned("Manufacturer's UUID."))
        .with_attribute("created", server_assigned("Manufacturer's creation date."))
        .with_attribute(
            "last_updated",
            server_assigned("Manufacturer's last update."),
        )
        .with_attribute(
            "display",
            Attribute::string(Disposition::OptionalComputed)
                .with_description("Manufacturer's display name."),
        )
        .with_attribute(
            "name",
            Attribute::string(Disposition::Required).with_description("Manufacturer's name."),
        )
        .with_attribute(
            "slug",
            Attribute::string(Disposition::OptionalComputed)
                .with_description("Manufacturer's slug."),
        )
        .with_attribute(
            "description",
            Attribute::string(Disposition::Optional)
                .with_description("Manufacturer's description."),
        )
        .with_attribute(
            "notes_url",
            Attribute::string(Disposition::OptionalComputed)
                .with_description("Notes for manufacturer."),
        )
        .with_attribute(
            "url",
            Attribute::string(Disposition::OptionalComputed)
                .with_description("Manufacturer's URL."),
        )
        .with_attribute(
            "devicetype_count",
            Attribute::int64(Disposition::Computed)
                .with_description("Manufacturer's device count."),
        )
        .with_attribute(
            "inventoryitem_count",
            Attribute::int64(Disposition::Computed)
                .with_description("Manufacturer's inventory item count."),
        )
        .with_attribute(
            "platform_count",
            Attribute::int64(Disposition::Computed)
                .with_description("Manufacturer's platform count."),
        )
        .with_attribute(
            "custom_fields",
            Attribute::map(AttrType::Dynamic, Disposition::OptionalComputed)
                .with_description("Manufacturer custom fields."),
        )
}

/// Lists every manufacturer known to the instance.
#[derive(Debug, Default)]
pub struct ManufacturersDataSource {
    client: Option<Arc<ApiClient>>,
}

impl ManufacturersDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory registered with the provider.
    pub fn boxed() -> Box<dyn DataSource> {
        Box::new(Self::new())
    }
}

#[async_trait]
impl DataSource for ManufacturersDataSource {
    fn type_suffix(&self) -> &'static str {
        "manufacturers"
    }

    fn schema(&self) -> Schema {
        Schema::new(ObjectSchema::new().with_attribute(
            ManufacturerListing::ATTRIBUTE,
            Attribute::list_nested(manufacturer_schema(), Disposition::Computed)
                .with_description("Manufacturers defined in Nautobot."),
        ))
        .with_description("Read every manufacturer defined in Nautobot.")
    }

    fn configure(&mut self, client: Option<Arc<ApiClient>>) {
        self.client = client;
    }

    async fn read(&self, request: ReadRequest) -> ReadResponse {
        let Some(client) = &self.client else {
            return ReadResponse::failed(unconfigured(self.type_suffix()));
        };
        read_list::<ManufacturerListing>(client, &self.schema(), &request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nautobot_api::{Field, PageEnvelope};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::read::ReadPhase;

    fn element() -> ObjectSchema {
        ManufacturersDataSource::new()
            .schema()
            .attribute("manufacturers")
            .and_then(Attribute::nested_object)
            .cloned()
            .unwrap()
    }

    #[test]
    fn type_name_is_prefixed_by_provider() {
        assert_eq!(
            ManufacturersDataSource::new().type_name("nautobot"),
            "nautobot_manufacturers"
        );
    }

    #[test]
    fn schema_declares_every_leaf() {
        let element = element();
        let names: Vec<_> = element.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "created",
                "last_updated",
                "display",
                "name",
                "slug",
                "description",
                "notes_url",
                "url",
                "devicetype_count",
                "inventoryitem_count",
                "platform_count",
                "custom_fields",
            ]
        );
        assert!(element.get("name").unwrap().disposition.is_required());
        assert_eq!(
            element.get("id").unwrap().null_policy,
            NullPolicy::ZeroValue
        );
        assert!(element.iter().all(|(_, a)| !a.description.is_empty()));
        assert_eq!(element.get("id").unwrap().description, "Manufacturer's UUID.");
        assert_eq!(
            element.get("devicetype_count").unwrap().description,
            "Manufacturer's device count."
        );
    }

    #[test]
    fn lifting_preserves_every_scalar_leaf() {
        let page: PageEnvelope<Manufacturer> = serde_json::from_value(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": "2c5b8c3e-0f4e-4c1e-9a7d-3b1f6e2d9a10",
                "created": "2023-05-14T08:21:09.123456Z",
                "last_updated": "2024-11-02T17:45:00.654321Z",
                "display": "Juniper Networks",
                "name": "Juniper",
                "slug": "juniper",
                "description": "Routing and switching vendor",
                "notes_url": "https://nb.example.com/api/dcim/manufacturers/2c5b8c3e-0f4e-4c1e-9a7d-3b1f6e2d9a10/notes/",
                "url": "https://nb.example.com/api/dcim/manufacturers/2c5b8c3e-0f4e-4c1e-9a7d-3b1f6e2d9a10/",
                "devicetype_count": 17,
                "inventoryitem_count": 4093,
                "platform_count": 9_007_199_254_740_993_i64,
                "custom_fields": {}
            }]
        }))
        .unwrap();

        let record = &page.results[0];
        let path = AttributePath::root("manufacturers").index(0);
        let value = record.lift(&element(), &path).unwrap();

        let strings = [
            ("id", &record.id),
            ("created", &record.created),
            ("last_updated", &record.last_updated),
            ("display", &record.display),
            ("name", &record.name),
            ("slug", &record.slug),
            ("description", &record.description),
            ("notes_url", &record.notes_url),
            ("url", &record.url),
        ];
        for (name, field) in strings {
            let Field::Present(expected) = field else {
                panic!("{name} did not decode");
            };
            assert_eq!(
                value.get(name).and_then(AttributeValue::as_str),
                Some(expected.as_str()),
                "{name}"
            );
        }

        let counts = [
            ("devicetype_count", 17),
            ("inventoryitem_count", 4093),
            ("platform_count", 9_007_199_254_740_993),
        ];
        for (name, expected) in counts {
            assert_eq!(
                value.get(name).and_then(AttributeValue::as_i64),
                Some(expected),
                "{name}"
            );
        }
    }

    #[test]
    fn lifts_a_full_record() {
        let record: Manufacturer = serde_json::from_value(json!({
            "id": "11111111-1111-1111-1111-111111111111",
            "name": "Acme",
            "slug": "acme",
            "description": "",
            "display": "Acme",
            "url": "https://nb.example.com/api/dcim/manufacturers/11111111-1111-1111-1111-111111111111/",
            "notes_url": "",
            "created": "2024-01-01T00:00:00Z",
            "last_updated": "2024-01-01T00:00:00Z",
            "devicetype_count": 3,
            "inventoryitem_count": 0,
            "platform_count": 1,
            "custom_fields": { "support_tier": "gold" }
        }))
        .unwrap();

        let path = AttributePath::root("manufacturers").index(0);
        let value = record.lift(&element(), &path).unwrap();

        assert_eq!(value.get("name"), Some(&AttributeValue::string("Acme")));
        assert_eq!(
            value.get("id").and_then(AttributeValue::as_str),
            Some("11111111-1111-1111-1111-111111111111")
        );
        assert_eq!(value.get("devicetype_count"), Some(&AttributeValue::int64(3)));
        assert_eq!(
            value.get("custom_fields").and_then(|c| c.get("support_tier")),
            Some(&AttributeValue::string("gold"))
        );
    }

    #[test]
    fn nulls_follow_each_leaf_policy() {
        let record: Manufacturer = serde_json::from_value(json!({
            "id": null,
            "name": "Acme",
            "display": null,
            "custom_fields": null
        }))
        .unwrap();

        let path = AttributePath::root("manufacturers").index(0);
        let value = record.lift(&element(), &path).unwrap();

        assert_eq!(value.get("id"), Some(&AttributeValue::string("")));
        assert_eq!(value.get("display"), Some(&AttributeValue::Null));
        assert_eq!(value.get("custom_fields"), Some(&AttributeValue::Null));
        assert_eq!(value.get("platform_count"), Some(&AttributeValue::int64(0)));
    }

    #[test]
    fn null_name_is_a_lift_error() {
        let record: Manufacturer = serde_json::from_value(json!({ "name": null })).unwrap();
        let path = AttributePath::root("manufacturers").index(2);
        let err = record.lift(&element(), &path).unwrap_err();
        assert_eq!(err.path().to_string(), "manufacturers[2].name");
    }

    #[tokio::test]
    async fn unconfigured_read_fails_without_state() {
        let resp = ManufacturersDataSource::new()
            .read(ReadRequest::default())
            .await;
        assert_eq!(resp.phase, ReadPhase::Failed);
        assert!(resp.state.is_none());
        assert_eq!(resp.diagnostics[0].summary, "Unconfigured data source");
    }
}
