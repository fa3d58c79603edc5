use async_trait::async_trait;
use tracing::{info, warn};

use nautobot_config::Resolver;
use nautobot_core::{
    ApiClient, Attribute, ConfigureResponse, DataSourceFactory, Diagnostic, Diagnostics,
    Disposition, HostConfig, ManufacturersDataSource, ObjectSchema, Provider, ProviderMetadata,
    Schema,
};

/// The `nautobot` provider.
#[derive(Debug, Clone)]
pub struct NautobotProvider {
    version: String,
    resolver: Resolver,
}

impl NautobotProvider {
    pub const TYPE_NAME: &'static str = "nautobot";

    /// Provider resolving its defaults from the process environment.
    pub fn new(version: impl Into<String>) -> Self {
        Self::with_resolver(version, Resolver::from_env())
    }

    pub fn with_resolver(version: impl Into<String>, resolver: Resolver) -> Self {
        Self {
            version: version.into(),
            resolver,
        }
    }
}

#[async_trait]
impl Provider for NautobotProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: Self::TYPE_NAME.into(),
            version: self.version.clone(),
        }
    }

    fn schema(&self) -> Schema {
        Schema::new(
            ObjectSchema::new()
                .with_attribute(
                    "url",
                    Attribute::string(Disposition::Optional).with_description(
                        "Base URL of the Nautobot instance, e.g. https://nautobot.example.com. \
                         Falls back to NAUTOBOT_URL.",
                    ),
                )
                .with_attribute(
                    "token",
                    Attribute::string(Disposition::Optional)
                        .with_description("Nautobot API token. Falls back to NAUTOBOT_TOKEN.")
                        .sensitive(),
                ),
        )
        .with_description("Read data from a Nautobot instance.")
    }

    async fn configure(&self, config: HostConfig) -> ConfigureResponse {
        let client_config = match self.resolver.resolve(&config) {
            Ok(client_config) => client_config,
            Err(errors) => {
                warn!(problems = errors.len(), "provider configuration rejected");
                return ConfigureResponse::failed(
                    errors.into_iter().map(Diagnostic::from).collect::<Diagnostics>(),
                );
            }
        };

        match ApiClient::new(&client_config) {
            Ok(client) => {
                info!(base_url = %client.base_url(), "configured Nautobot client");
                ConfigureResponse::configured(client)
            }
            Err(e) => ConfigureResponse::failed(Diagnostic::error(
                "Unable to create Nautobot client",
                e.to_string(),
            )),
        }
    }

    fn data_sources(&self) -> Vec<DataSourceFactory> {
        vec![ManufacturersDataSource::boxed]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Figment;
    use nautobot_core::{Attr, Severity};
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    use super::*;

    fn provider(figment: Figment) -> NautobotProvider {
        NautobotProvider::with_resolver("test", Resolver::with_figment(figment))
    }

    #[test]
    fn metadata_and_registries() {
        let p = provider(Figment::new());
        assert_eq!(p.metadata().type_name, "nautobot");
        assert!(p.resources().is_empty());

        let names: Vec<_> = p
            .data_sources()
            .into_iter()
            .map(|factory| factory().type_name("nautobot"))
            .collect();
        assert_eq!(names, vec!["nautobot_manufacturers"]);
    }

    #[test]
    fn schema_marks_token_sensitive() {
        let schema = provider(Figment::new()).schema();
        let url = schema.attribute("url").unwrap();
        let token = schema.attribute("token").unwrap();
        assert_eq!(url.disposition, Disposition::Optional);
        assert!(!url.sensitive);
        assert_eq!(token.disposition, Disposition::Optional);
        assert!(token.sensitive);
    }

    #[tokio::test]
    async fn configure_exports_client() {
        let p = provider(Figment::new().merge(("token", "abc")));
        let resp = p
            .configure(HostConfig {
                url: Attr::Known("https://nb.example.com".into()),
                token: Attr::Null,
            })
            .await;
        assert!(resp.diagnostics.is_empty());
        let client = resp.client.unwrap();
        assert_eq!(client.base_url().as_str(), "https://nb.example.com/");
    }

    #[tokio::test]
    async fn configure_reports_every_problem() {
        let resp = provider(Figment::new()).configure(HostConfig::default()).await;
        assert!(resp.client.is_none());
        let summaries: Vec<_> = resp.diagnostics.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["Missing Nautobot URL", "Missing Nautobot token"]);
        assert!(resp.diagnostics.iter().all(|d| d.severity == Severity::Error));
    }

    #[tokio::test]
    async fn unreadable_ca_fails_configure() {
        let p = provider(Figment::new().merge(("ca_cert", "/nonexistent/ca.pem")));
        let resp = p
            .configure(HostConfig {
                url: Attr::Known("https://nb.example.com".into()),
                token: Attr::Known(SecretString::from("abc")),
            })
            .await;
        assert!(resp.client.is_none());
        assert_eq!(resp.diagnostics[0].summary, "Unable to create Nautobot client");
    }
}
