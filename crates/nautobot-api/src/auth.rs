use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Token credential for the Nautobot REST API.
///
/// Holds the pre-rendered `Authorization: Token <token>` header value,
/// flagged sensitive so it never shows up in reqwest's debug output.
/// Immutable once built; clone freely across concurrent reads.
#[derive(Clone)]
pub struct Credential {
    header: HeaderValue,
}

impl Credential {
    /// The literal prefix Nautobot expects in front of the token.
    pub const SCHEME: &'static str = "Token ";

    /// Build a credential from a token.
    ///
    /// Rejects empty tokens and tokens containing line breaks or other
    /// bytes that are not legal in an HTTP header value.
    pub fn new(token: &SecretString) -> Result<Self, Error> {
        let raw = token.expose_secret();
        if raw.is_empty() {
            return Err(Error::InvalidCredential {
                reason: "token is empty".into(),
            });
        }
        if raw.contains(['\n', '\r']) {
            return Err(Error::InvalidCredential {
                reason: "token contains a line break".into(),
            });
        }

        let mut header = HeaderValue::from_str(&format!("{}{raw}", Self::SCHEME)).map_err(|_| {
            Error::InvalidCredential {
                reason: "token contains characters not allowed in an HTTP header".into(),
            }
        })?;
        header.set_sensitive(true);

        Ok(Self { header })
    }

    /// Set the `Authorization` header on a pending request.
    ///
    /// Replaces any existing value, so decorating twice is a no-op.
    pub fn decorate(&self, mut request: reqwest::Request) -> reqwest::Request {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.header.clone());
        request
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("header", &"Token [REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> reqwest::Request {
        reqwest::Client::new()
            .get("https://nb.example.com/api/dcim/manufacturers/")
            .build()
            .unwrap()
    }

    #[test]
    fn decorate_sets_token_header() {
        let cred = Credential::new(&SecretString::from("abc")).unwrap();
        let req = cred.decorate(request());
        assert_eq!(req.headers()[AUTHORIZATION], "Token abc");
    }

    #[test]
    fn decorate_is_idempotent() {
        let cred = Credential::new(&SecretString::from("abc")).unwrap();
        let req = cred.decorate(cred.decorate(request()));
        let values: Vec<_> = req.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "Token abc");
    }

    #[test]
    fn rejects_empty_token() {
        let err = Credential::new(&SecretString::from("")).unwrap_err();
        assert!(matches!(err, Error::InvalidCredential { .. }));
    }

    #[test]
    fn rejects_line_breaks() {
        for token in ["abc\ndef", "abc\r\nX-Injected: 1"] {
            let err = Credential::new(&SecretString::from(token)).unwrap_err();
            assert!(
                matches!(err, Error::InvalidCredential { ref reason } if reason.contains("line break")),
                "unexpected: {err:?}"
            );
        }
    }

    #[test]
    fn debug_output_redacts_token() {
        let cred = Credential::new(&SecretString::from("supersecret")).unwrap();
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains("supersecret"));
    }
}
