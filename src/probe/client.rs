//! HTTP transport abstraction.
//!
//! The trait exposes exactly one exchange per call: send a GET, read the
//! full body, never follow redirects. Hop-by-hop redirect handling and the
//! combined deadline live in the scheduling loop, which keeps this seam
//! narrow enough to swap in a scripted transport for tests.

use url::Url;

use isahc::config::{Configurable, RedirectPolicy};
use isahc::cookies::{Cookie, CookieJar};
use isahc::http::Uri;
use isahc::{AsyncReadResponseExt, HttpClient, Request};

use crate::config::CookieEntry;
use crate::probe::classify::TransportError;
use crate::probe::types::ProbeError;

/// Response of a single HTTP exchange (one hop, redirects not followed)
#[derive(Debug, Clone)]
pub struct HopResponse {
    pub status: u16,
    /// Lowercased header names in response order
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HopResponse {
    /// Look up a header by its lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One GET exchange against a URL
#[async_trait::async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Execute a GET request and read the full response body.
    ///
    /// # Returns
    /// * `Ok(HopResponse)` - status, headers and complete body
    /// * `Err(TransportError)` - classified transport failure, including a
    ///   failed body read
    async fn fetch(&self, url: &str) -> Result<HopResponse, TransportError>;
}

/// Production transport backed by a shared isahc client.
///
/// The client is created once per run: cookie jar preset from the merged
/// cookie set, automatic redirects off, connection cache disabled so every
/// tick opens a fresh connection.
pub struct IsahcTransport {
    client: HttpClient,
}

impl IsahcTransport {
    pub fn new(cookies: &[CookieEntry], target: &Url) -> Result<Self, ProbeError> {
        let jar = CookieJar::default();
        if !cookies.is_empty() {
            let uri: Uri = target.as_str().parse().map_err(|e| {
                ProbeError::Client(format!("invalid target url for cookie jar: {e}"))
            })?;
            for entry in cookies {
                let cookie = Cookie::builder(entry.key.clone(), entry.value.clone())
                    .build()
                    .map_err(|e| {
                        ProbeError::Client(format!("invalid cookie {:?}: {e}", entry.key))
                    })?;
                jar.set(cookie, &uri).map_err(|e| {
                    ProbeError::Client(format!("failed to set cookie {:?}: {e}", entry.key))
                })?;
            }
        }

        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::None)
            .connection_cache_size(0)
            .cookie_jar(jar)
            .build()
            .map_err(|e| ProbeError::Client(format!("failed to create http client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ProbeTransport for IsahcTransport {
    async fn fetch(&self, url: &str) -> Result<HopResponse, TransportError> {
        let request = Request::get(url)
            .header("user-agent", concat!("pulsecheck/", env!("CARGO_PKG_VERSION")))
            .body(Vec::new())
            .map_err(|e| TransportError::Other(format!("failed to build request: {e}")))?;

        let mut response = self
            .client
            .send_async(request)
            .await
            .map_err(TransportError::from)?;

        let status = response.status().as_u16();

        let mut headers = Vec::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.push((key.as_str().to_lowercase(), value_str.to_string()));
            }
        }

        // A failed body read classifies like any other transport failure
        let body = response.bytes().await.map_err(TransportError::from)?;

        Ok(HopResponse {
            status,
            headers,
            body,
        })
    }
}
