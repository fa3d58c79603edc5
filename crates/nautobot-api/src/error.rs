use thiserror::Error;

/// Top-level error type for the `nautobot-api` crate.
///
/// Covers every failure mode of a single upstream call: credential
/// construction, transport, non-2xx responses, and body decoding.
/// `nautobot-core` maps these into host-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The token cannot be turned into an `Authorization` header.
    #[error("Invalid credential: {reason}")]
    InvalidCredential { reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// Upstream answered with a non-2xx status.
    #[error("Nautobot API error (HTTP {status}): {body}")]
    Status { status: u16, body: String },

    /// A pagination link points at a different origin than the client.
    #[error("Refusing to follow page link to foreign origin: {url}")]
    ForeignPageUrl { url: String },

    /// A pagination link names the API host under another scheme, as
    /// Nautobot does behind a TLS-terminating proxy that drops the
    /// forwarded protocol.
    #[error(
        "Refusing to follow page link {url}: the API root uses {expected}. \
         If Nautobot runs behind a TLS-terminating proxy, make the proxy send \
         X-Forwarded-Proto so Nautobot builds {expected} links"
    )]
    PageSchemeMismatch { url: String, expected: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Decode { message: String, body: String },
}

impl Error {
    /// HTTP status of a protocol error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if upstream rejected the token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this workspace retries; callers outside it may.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
