// ── Data sources ──
//
// Host-facing read-only objects. Each data source declares a schema,
// receives the shared client once the provider is configured, and turns
// a read request into a published state or diagnostics.

mod manufacturers;

use std::sync::Arc;

use async_trait::async_trait;

pub use manufacturers::{ManufacturerListing, ManufacturersDataSource};

use crate::client::ApiClient;
use crate::diag::Diagnostic;
use crate::read::{ReadRequest, ReadResponse};
use crate::schema::Schema;

/// Builds a fresh, unconfigured data source.
pub type DataSourceFactory = fn() -> Box<dyn DataSource>;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Suffix appended to the provider type name, e.g. `"manufacturers"`.
    fn type_suffix(&self) -> &'static str;

    /// Full type name as the host addresses it: `<provider>_<suffix>`.
    fn type_name(&self, provider_type_name: &str) -> String {
        format!("{provider_type_name}_{}", self.type_suffix())
    }

    fn schema(&self) -> Schema;

    /// Receive the client exported by the provider's Configure.
    ///
    /// `None` means the provider has not been configured yet; the source
    /// keeps working but every read fails with a diagnostic.
    fn configure(&mut self, client: Option<Arc<ApiClient>>);

    async fn read(&self, request: ReadRequest) -> ReadResponse;
}

/// Diagnostic for a read attempted before the provider was configured.
pub(crate) fn unconfigured(type_suffix: &str) -> Diagnostic {
    Diagnostic::error(
        "Unconfigured data source",
        format!(
            "the {type_suffix} data source has no Nautobot client; \
             configure the provider before reading"
        ),
    )
}
