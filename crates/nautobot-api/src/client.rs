// Async HTTP client for the Nautobot REST API.
//
// Base path: /api/
// Auth: `Authorization: Token <token>`, applied per request by the
// credential's decorate hook.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credential;
use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{ListManufacturersParams, Manufacturer, PageEnvelope};

/// Upper bound on error bodies carried inside [`Error::Status`].
const ERROR_BODY_LIMIT: usize = 512;
/// Upper bound on the body preview inside [`Error::Decode`] messages.
const DECODE_PREVIEW_LIMIT: usize = 200;

/// Cut `body` to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_utf8(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

// ── HttpResponse ─────────────────────────────────────────────────────

/// A successful (2xx) upstream response with its raw body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
    pub body: Bytes,
}

impl HttpResponse {
    /// Decode the body as JSON.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| {
            let body = String::from_utf8_lossy(&self.body).into_owned();
            let preview = truncate_utf8(&body, DECODE_PREVIEW_LIMIT);
            Error::Decode {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Decode the body as a page envelope and check its shape.
    pub fn decode_page<T: DeserializeOwned>(&self) -> Result<PageEnvelope<T>, Error> {
        let page: PageEnvelope<T> = self.decode()?;
        let received = u64::try_from(page.results.len()).unwrap_or(u64::MAX);
        if received > page.count {
            return Err(Error::Decode {
                message: format!(
                    "page carries {received} results but reports a count of {}",
                    page.count
                ),
                body: String::from_utf8_lossy(&self.body).into_owned(),
            });
        }
        Ok(page)
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Nautobot REST API.
///
/// Cheap to share by reference: holds no mutable state, so concurrent
/// reads can use one instance without locking.
#[derive(Debug, Clone)]
pub struct NautobotClient {
    http: reqwest::Client,
    base_url: Url,
    credential: Credential,
}

impl NautobotClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, credential, and transport config.
    pub fn new(
        base_url: &str,
        credential: Credential,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, credential)
    }

    /// Wrap an existing `reqwest::Client`.
    ///
    /// The credential is still applied to every request.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        credential: Credential,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            credential,
        })
    }

    /// Build the API root: `https://host[/prefix]/api/`.
    ///
    /// Accepts the instance root with or without a trailing slash, and
    /// tolerates a URL that already ends in `/api`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }

        Ok(url)
    }

    /// The API root every endpoint path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"dcim/manufacturers/"`) onto the API root.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get_raw<Q: Serialize + ?Sized>(
        &self,
        url: Url,
        query: Option<&Q>,
    ) -> Result<HttpResponse, Error> {
        let mut builder = self.http.get(url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        let request = self.credential.decorate(builder.build()?);
        debug!("GET {}", request.url());

        let resp = self.http.execute(request).await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(resp: reqwest::Response) -> Result<HttpResponse, Error> {
        let status = resp.status();
        let url = resp.url().clone();
        let headers = resp.headers().clone();

        if status.is_success() {
            let body = resp.bytes().await?;
            Ok(HttpResponse {
                status,
                headers,
                url,
                body,
            })
        } else {
            let raw = resp.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "upstream returned an error status");
            Err(Error::Status {
                status: status.as_u16(),
                body: truncate_utf8(&raw, ERROR_BODY_LIMIT).to_owned(),
            })
        }
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Fetch a `next`/`previous` link from an earlier page.
    ///
    /// The link must share scheme, host, and port with the API root;
    /// anything else would leak the token to a third party.
    pub async fn follow_raw(&self, link: &Url) -> Result<HttpResponse, Error> {
        if link.origin() != self.base_url.origin() {
            if link.host() == self.base_url.host() && link.scheme() != self.base_url.scheme() {
                return Err(Error::PageSchemeMismatch {
                    url: link.to_string(),
                    expected: self.base_url.scheme().to_owned(),
                });
            }
            return Err(Error::ForeignPageUrl {
                url: link.to_string(),
            });
        }
        self.get_raw::<()>(link.clone(), None).await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── DCIM: manufacturers ──────────────────────────────────────────

    /// `GET /api/dcim/manufacturers/`, body left undecoded.
    pub async fn list_manufacturers_raw(
        &self,
        params: &ListManufacturersParams,
    ) -> Result<HttpResponse, Error> {
        let url = self.url("dcim/manufacturers/")?;
        self.get_raw(url, Some(params)).await
    }

    /// `GET /api/dcim/manufacturers/`, decoded into a page envelope.
    pub async fn list_manufacturers(
        &self,
        params: &ListManufacturersParams,
    ) -> Result<(HttpResponse, PageEnvelope<Manufacturer>), Error> {
        let resp = self.list_manufacturers_raw(params).await?;
        let page = resp.decode_page()?;
        Ok((resp, page))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn client(base: &str) -> NautobotClient {
        let cred = Credential::new(&SecretString::from("abc")).unwrap();
        NautobotClient::with_client(reqwest::Client::new(), base, cred).unwrap()
    }

    #[test]
    fn base_url_gains_api_prefix() {
        for raw in [
            "https://nb.example.com",
            "https://nb.example.com/",
            "https://nb.example.com/api",
            "https://nb.example.com/api/",
        ] {
            assert_eq!(
                client(raw).base_url().as_str(),
                "https://nb.example.com/api/",
                "input: {raw}"
            );
        }
    }

    #[test]
    fn base_url_keeps_path_prefix() {
        assert_eq!(
            client("https://example.com/nautobot").base_url().as_str(),
            "https://example.com/nautobot/api/"
        );
    }

    #[test]
    fn manufacturers_url() {
        let c = client("https://nb.example.com");
        assert_eq!(
            c.url("dcim/manufacturers/").unwrap().as_str(),
            "https://nb.example.com/api/dcim/manufacturers/"
        );
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = "é".repeat(10);
        let cut = truncate_utf8(&body, 5);
        assert_eq!(cut, "éé");
        assert_eq!(truncate_utf8("short", 512), "short");
    }

    #[test]
    fn count_smaller_than_results_is_a_decode_error() {
        let resp = HttpResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            url: Url::parse("https://nb.example.com/api/dcim/manufacturers/").unwrap(),
            body: Bytes::from_static(br#"{"count":0,"results":[{"name":"a"}]}"#),
        };
        let err = resp.decode_page::<Manufacturer>().unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
