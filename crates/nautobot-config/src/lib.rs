//! Provider configuration resolution.
//!
//! Merges the host's provider block (`url`, `token`) with `NAUTOBOT_*`
//! environment defaults and turns the result into a validated
//! [`nautobot_core::ClientConfig`]. Every problem found in a pass is
//! reported at once so users can fix them together.

use std::num::{NonZeroU32, NonZeroUsize};
use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use nautobot_api::Credential;
use nautobot_core::{
    Attr, AttributePath, ClientConfig, Diagnostic, HostConfig, PagingConfig, TlsVerification,
};

/// Prefix of every environment variable the provider reads.
pub const ENV_PREFIX: &str = "NAUTOBOT_";
pub const URL_ENV: &str = "NAUTOBOT_URL";
pub const TOKEN_ENV: &str = "NAUTOBOT_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown Nautobot URL")]
    UnknownUrl,

    #[error("Unknown Nautobot token")]
    UnknownToken,

    #[error("Missing Nautobot URL")]
    MissingUrl,

    #[error("Missing Nautobot token")]
    MissingToken,

    #[error("Invalid Nautobot URL")]
    InvalidUrl { reason: String },

    #[error("Invalid Nautobot token")]
    InvalidCredential { reason: String },

    #[error("Invalid NAUTOBOT_* environment")]
    InvalidEnvironment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::InvalidEnvironment(Box::new(err))
    }
}

impl ConfigError {
    /// Provider attribute the problem is attached to.
    pub fn path(&self) -> Option<AttributePath> {
        match self {
            Self::UnknownUrl | Self::MissingUrl | Self::InvalidUrl { .. } => {
                Some(AttributePath::root("url"))
            }
            Self::UnknownToken | Self::MissingToken | Self::InvalidCredential { .. } => {
                Some(AttributePath::root("token"))
            }
            Self::InvalidEnvironment(_) => None,
        }
    }

    /// What the user should change.
    pub fn detail(&self) -> String {
        match self {
            Self::UnknownUrl => "The provider cannot create the Nautobot client because the \
                 url value is not known yet. Set it statically in the provider \
                 block, use the NAUTOBOT_URL environment variable, or apply the \
                 resource it depends on first."
                .into(),
            Self::UnknownToken => "The provider cannot create the Nautobot client because the \
                 token value is not known yet. Set it statically in the provider \
                 block, use the NAUTOBOT_TOKEN environment variable, or apply the \
                 resource it depends on first."
                .into(),
            Self::MissingUrl => "The provider has no Nautobot URL. Set url in the provider \
                 block or the NAUTOBOT_URL environment variable. If either is \
                 already set, make sure it is not empty."
                .into(),
            Self::MissingToken => "The provider has no Nautobot API token. Set token in the \
                 provider block or the NAUTOBOT_TOKEN environment variable. If \
                 either is already set, make sure it is not empty."
                .into(),
            Self::InvalidUrl { reason } => format!(
                "{reason}. Use the absolute http(s) address of the Nautobot instance, \
                 e.g. https://nautobot.example.com."
            ),
            Self::InvalidCredential { reason } => {
                format!("{reason}. Copy the token again from the Nautobot user profile.")
            }
            Self::InvalidEnvironment(err) => format!(
                "{err}. Fix or unset the offending NAUTOBOT_* environment variable."
            ),
        }
    }
}

impl From<ConfigError> for Diagnostic {
    fn from(err: ConfigError) -> Self {
        let detail = err.detail();
        match err.path() {
            Some(path) => Diagnostic::attribute_error(path, err.to_string(), detail),
            None => Diagnostic::error(err.to_string(), detail),
        }
    }
}

// ── Environment layer ───────────────────────────────────────────────

/// Tuning values read from `NAUTOBOT_*`. Everything is optional.
#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    /// Request timeout in seconds.
    timeout: Option<u64>,
    insecure: Option<bool>,
    ca_cert: Option<PathBuf>,
    page_size: Option<NonZeroU32>,
    max_pages: Option<NonZeroUsize>,
}

/// Identity values taken verbatim, so a numeric-looking token stays a string.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Identity {
    url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Clone)]
enum EnvSource {
    /// Read the process environment at resolution time.
    Process,
    /// Use a prebuilt figment in place of the environment.
    Fixed(Figment),
}

// ── Resolver ────────────────────────────────────────────────────────

/// Host configuration ⊕ environment → [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct Resolver {
    source: EnvSource,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Resolver {
    /// Resolve against the process environment.
    pub fn from_env() -> Self {
        Self {
            source: EnvSource::Process,
        }
    }

    /// Resolve against `figment` instead of the environment. Keys are the
    /// lowercase variable names without the prefix (`url`, `token`,
    /// `timeout`, ...).
    pub fn with_figment(figment: Figment) -> Self {
        Self {
            source: EnvSource::Fixed(figment),
        }
    }

    fn environment(&self) -> Figment {
        match &self.source {
            EnvSource::Process => Figment::new()
                .merge(Serialized::defaults(Identity {
                    url: Env::var(URL_ENV),
                    token: Env::var(TOKEN_ENV),
                }))
                .merge(Env::prefixed(ENV_PREFIX).ignore(&["url", "token"])),
            EnvSource::Fixed(figment) => figment.clone(),
        }
    }

    /// Resolve `host` into a client configuration.
    ///
    /// Halts after each stage that found problems: unknown values first
    /// (before the environment is consulted), then missing values, then
    /// malformed ones. A malformed tuning variable is reported alongside
    /// whichever stage halts.
    pub fn resolve(&self, host: &HostConfig) -> Result<ClientConfig, Vec<ConfigError>> {
        // ── Unknown ──
        let mut errors = Vec::new();
        if host.url.is_unknown() {
            errors.push(ConfigError::UnknownUrl);
        }
        if host.token.is_unknown() {
            errors.push(ConfigError::UnknownToken);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        // Identity and tuning are extracted apart so a malformed tuning
        // variable still lets the missing values be reported.
        let environment = self.environment();
        let identity = match environment.extract::<Identity>() {
            Ok(identity) => identity,
            Err(e) => {
                errors.push(ConfigError::from(e));
                Identity::default()
            }
        };
        let (env, env_error) = match environment.extract::<EnvSettings>() {
            Ok(env) => (env, None),
            Err(e) => (EnvSettings::default(), Some(ConfigError::from(e))),
        };

        // ── Missing ──
        let url = match &host.url {
            Attr::Known(url) => Some(url.clone()),
            Attr::Null | Attr::Unknown => identity.url,
        }
        .filter(|url| !url.trim().is_empty());

        let token = match &host.token {
            Attr::Known(token) => Some(token.clone()),
            Attr::Null | Attr::Unknown => identity.token.map(SecretString::from),
        }
        .filter(|token| !token.expose_secret().is_empty());

        debug!(
            url_from_env = host.url.is_null(),
            token_from_env = host.token.is_null(),
            "resolving provider configuration"
        );

        if url.is_none() {
            errors.push(ConfigError::MissingUrl);
        }
        if token.is_none() {
            errors.push(ConfigError::MissingToken);
        }
        let (Some(url), Some(token)) = (url, token) else {
            errors.extend(env_error);
            return Err(errors);
        };

        // ── Invalid ──
        let base_url = match parse_base_url(&url) {
            Ok(base_url) => Some(base_url),
            Err(e) => {
                errors.push(e);
                None
            }
        };
        if let Err(e) = Credential::new(&token) {
            errors.push(ConfigError::InvalidCredential {
                reason: match e {
                    nautobot_api::Error::InvalidCredential { reason } => reason,
                    other => other.to_string(),
                },
            });
        }
        errors.extend(env_error);
        let Some(base_url) = base_url.filter(|_| errors.is_empty()) else {
            return Err(errors);
        };

        debug!(base_url = %base_url, "provider configuration resolved");
        Ok(ClientConfig {
            base_url,
            token,
            tls: tls_from(&env),
            timeout: env
                .timeout
                .map_or(ClientConfig::DEFAULT_TIMEOUT, Duration::from_secs),
            paging: PagingConfig {
                page_size: env.page_size,
                max_pages: env.max_pages,
            },
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        reason: format!("{raw:?} is not a valid URL ({e})"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            reason: format!("unsupported scheme {:?}", url.scheme()),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            reason: format!("{raw:?} has no host"),
        });
    }
    Ok(url)
}

fn tls_from(env: &EnvSettings) -> TlsVerification {
    if env.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = env.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}
