// ── Provider contract ──
//
// What the host calls on the plugin: metadata, schema, Configure, and the
// registries of data sources and resources. Configure exports one
// `ApiClient` which every data source then shares by `Arc`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::attr::Attr;
use crate::client::ApiClient;
use crate::data_source::{DataSource, DataSourceFactory};
use crate::diag::Diagnostics;
use crate::schema::Schema;

/// Provider configuration block as the host hands it over.
#[derive(Clone)]
pub struct HostConfig {
    pub url: Attr<String>,
    pub token: Attr<SecretString>,
}

impl Default for HostConfig {
    /// Both attributes left out of the configuration block.
    fn default() -> Self {
        Self {
            url: Attr::Null,
            token: Attr::Null,
        }
    }
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match &self.token {
            Attr::Null => "Null",
            Attr::Unknown => "Unknown",
            Attr::Known(_) => "Known([REDACTED])",
        };
        f.debug_struct("HostConfig")
            .field("url", &self.url)
            .field("token", &token)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    /// Prefix of every data source and resource type name.
    pub type_name: String,
    pub version: String,
}

/// Outcome of Configure: either a client to export, or error diagnostics.
#[derive(Debug, Default)]
pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
    pub client: Option<Arc<ApiClient>>,
}

impl ConfigureResponse {
    pub fn configured(client: ApiClient) -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            client: Some(Arc::new(client)),
        }
    }

    pub fn failed(diagnostics: impl Into<Diagnostics>) -> Self {
        Self {
            diagnostics: diagnostics.into(),
            client: None,
        }
    }
}

/// A managed (read-write) object. The Nautobot provider registers none.
pub trait Resource: Send + Sync {
    fn type_suffix(&self) -> &'static str;
    fn schema(&self) -> Schema;
}

pub type ResourceFactory = fn() -> Box<dyn Resource>;

#[async_trait]
pub trait Provider: Send + Sync {
    fn metadata(&self) -> ProviderMetadata;

    fn schema(&self) -> Schema;

    /// Resolve host configuration into a shared client.
    async fn configure(&self, config: HostConfig) -> ConfigureResponse;

    fn data_sources(&self) -> Vec<DataSourceFactory>;

    fn resources(&self) -> Vec<ResourceFactory> {
        Vec::new()
    }

    /// Instantiate the data source the host addresses as `type_name`
    /// and hand it the configured client.
    fn data_source(
        &self,
        type_name: &str,
        client: Option<Arc<ApiClient>>,
    ) -> Option<Box<dyn DataSource>> {
        let prefix = self.metadata().type_name;
        let mut source = self
            .data_sources()
            .into_iter()
            .map(|factory| factory())
            .find(|source| source.type_name(&prefix) == type_name)?;
        source.configure(client);
        Some(source)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::data_source::ManufacturersDataSource;
    use crate::diag::Diagnostic;
    use crate::read::ReadRequest;

    struct Stub;

    #[async_trait]
    impl Provider for Stub {
        fn metadata(&self) -> ProviderMetadata {
            ProviderMetadata {
                type_name: "nautobot".into(),
                version: "test".into(),
            }
        }

        fn schema(&self) -> Schema {
            Schema::default()
        }

        async fn configure(&self, _config: HostConfig) -> ConfigureResponse {
            ConfigureResponse::failed(Diagnostic::error("nope", ""))
        }

        fn data_sources(&self) -> Vec<DataSourceFactory> {
            vec![ManufacturersDataSource::boxed]
        }
    }

    #[test]
    fn host_config_debug_hides_token() {
        let config = HostConfig {
            url: Attr::Known("https://nb.example.com".into()),
            token: Attr::Known(SecretString::from("super-secret")),
        };
        let text = format!("{config:?}");
        assert!(!text.contains("super-secret"));
        assert!(text.contains("REDACTED"));
    }

    #[test]
    fn registries() {
        assert!(Stub.resources().is_empty());
        assert_eq!(Stub.data_sources().len(), 1);
        assert!(Stub.data_source("nautobot_devices", None).is_none());
    }

    #[tokio::test]
    async fn data_source_lookup_by_type_name() {
        let source = Stub.data_source("nautobot_manufacturers", None).unwrap();
        assert_eq!(source.type_suffix(), "manufacturers");
        // Not configured: the read fails cleanly.
        let resp = source.read(ReadRequest::default()).await;
        assert!(resp.state.is_none());
    }
}
