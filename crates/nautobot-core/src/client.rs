// ── Shared upstream handle ──
//
// Built once per Configure and shared by `Arc` with every data source.
// Immutable after construction: concurrent reads need no locking.

use nautobot_api::{Credential, NautobotClient, TlsMode, TransportConfig};
use tracing::debug;
use url::Url;

use crate::config::{ClientConfig, PagingConfig, TlsVerification};
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    client: NautobotClient,
    paging: PagingConfig,
}

impl ApiClient {
    /// Build the HTTP client and bind the credential to it.
    ///
    /// Fails on a token that cannot form a header, an unreadable CA file,
    /// or a base URL that cannot be joined.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let credential = Credential::new(&config.token)?;
        let transport = build_transport(config);
        let client = NautobotClient::new(config.base_url.as_str(), credential, &transport)?;
        debug!(api_root = %client.base_url(), "built Nautobot client");

        Ok(Self {
            base_url: config.base_url.clone(),
            client,
            paging: config.paging,
        })
    }

    /// The instance root as configured (before `/api/` is appended).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn nautobot(&self) -> &NautobotClient {
        &self.client
    }

    pub fn paging(&self) -> PagingConfig {
        self.paging
    }
}

fn build_transport(config: &ClientConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn builds_from_config() {
        let config = ClientConfig::new(
            Url::parse("https://nautobot.example.com").unwrap(),
            SecretString::from("0123456789abcdef"),
        );
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "https://nautobot.example.com/");
        assert_eq!(
            client.nautobot().base_url().as_str(),
            "https://nautobot.example.com/api/"
        );
        assert_eq!(client.paging(), PagingConfig::default());
    }

    #[test]
    fn rejects_unusable_token() {
        let config = ClientConfig::new(
            Url::parse("https://nautobot.example.com").unwrap(),
            SecretString::from("bad\ntoken"),
        );
        assert!(matches!(
            ApiClient::new(&config),
            Err(CoreError::InvalidCredential { .. })
        ));
    }

    #[test]
    fn missing_ca_file_is_a_config_error() {
        let mut config = ClientConfig::new(
            Url::parse("https://nautobot.example.com").unwrap(),
            SecretString::from("abc"),
        );
        config.tls = TlsVerification::CustomCa("/nonexistent/ca.pem".into());
        assert!(matches!(ApiClient::new(&config), Err(CoreError::Config { .. })));
    }
}
