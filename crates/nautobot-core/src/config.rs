// ── Runtime connection configuration ──
//
// Describes *how* to reach a Nautobot instance once every source (host
// configuration, environment) has been merged. Core never reads the
// environment itself; `nautobot-config` builds a `ClientConfig` and hands
// it in.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab instances).
    DangerAcceptInvalid,
}

/// List paging behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingConfig {
    /// `limit` sent on the first request. `None` leaves it to the server.
    pub page_size: Option<NonZeroU32>,
    /// Stop after this many pages. `None` follows `next` until exhausted.
    pub max_pages: Option<NonZeroUsize>,
}

/// Everything needed to build an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Instance root, e.g. `https://nautobot.example.com`.
    pub base_url: Url,
    pub token: SecretString,
    pub tls: TlsVerification,
    pub timeout: Duration,
    pub paging: PagingConfig,
}

impl ClientConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Config with default TLS, timeout, and paging.
    pub fn new(base_url: Url, token: SecretString) -> Self {
        Self {
            base_url,
            token,
            tls: TlsVerification::default(),
            timeout: Self::DEFAULT_TIMEOUT,
            paging: PagingConfig::default(),
        }
    }
}
