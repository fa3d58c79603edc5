// ── Core error types ──
//
// Errors surfaced by the read pipeline. Consumers see them only as the
// detail text of a diagnostic; the `From<nautobot_api::Error>` impl keeps
// HTTP status and body so that text stays actionable.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Invalid credential: {reason}")]
    InvalidCredential { reason: String },

    #[error("Cannot reach Nautobot: {reason}")]
    Transport { reason: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Nautobot returned HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    #[error("Pagination error: {message}")]
    Pagination { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response body: {message}")]
    Decode { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("read cancelled")]
    Cancelled,
}

impl CoreError {
    /// HTTP status behind the error, if upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nautobot_api::Error> for CoreError {
    fn from(err: nautobot_api::Error) -> Self {
        match err {
            nautobot_api::Error::InvalidCredential { reason } => {
                CoreError::InvalidCredential { reason }
            }
            nautobot_api::Error::Status { status, body } => CoreError::Protocol { status, body },
            nautobot_api::Error::ForeignPageUrl { .. }
            | nautobot_api::Error::PageSchemeMismatch { .. } => CoreError::Pagination {
                message: err.to_string(),
            },
            nautobot_api::Error::Decode { message, .. } => CoreError::Decode { message },
            nautobot_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            nautobot_api::Error::Tls(message) => CoreError::Config { message },
            nautobot_api::Error::Transport(e) => CoreError::Transport {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_keep_code_and_body() {
        let err = CoreError::from(nautobot_api::Error::Status {
            status: 401,
            body: r#"{"detail":"Invalid token."}"#.into(),
        });
        assert_eq!(err.status(), Some(401));
        let text = err.to_string();
        assert!(text.contains("401"));
        assert!(text.contains("Invalid token."));
    }

    #[test]
    fn foreign_links_are_pagination_errors() {
        let err = CoreError::from(nautobot_api::Error::ForeignPageUrl {
            url: "https://evil.example/api/".into(),
        });
        assert!(matches!(err, CoreError::Pagination { ref message } if message.contains("evil.example")));
    }
}
