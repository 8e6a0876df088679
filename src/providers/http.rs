//! JSON-over-HTTP adapter for the geocoding, IP and destination-search capabilities.
//!
//! The adapter speaks one neutral JSON shape per capability (the serde forms of
//! [`PlaceName`], [`IpLocation`] and [`Destination`]); vendor-specific services are put
//! behind a small proxy or picked for compatibility. Endpoints are URL templates:
//! `{lat}` and `{lon}` are substituted for reverse geocoding and `{query}` (percent
//! encoded) for destination search.

use std::fmt::Write;
use std::sync::LazyLock;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{DestinationSearchProvider, GeocodingProvider, IpLocationProvider, ProviderResult};
use crate::error::ResolveError;
use crate::types::{Coordinates, Destination, IpLocation, PlaceName};

/// Shared HTTP client with connection pooling for every provider endpoint.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .timeout(Duration::from_secs(30))
        .user_agent(format!("waypoint/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build tuned HTTP client; using defaults");
            reqwest::Client::new()
        })
});

/// What: Handle to the process-wide HTTP client.
#[must_use]
pub fn shared_client() -> reqwest::Client {
    HTTP_CLIENT.clone()
}

/// Destination search bodies may be a bare list or wrapped in `results`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DestinationsBody {
    /// `[...]`
    List(Vec<Destination>),
    /// `{"results": [...]}`
    Wrapped {
        /// Wrapped list.
        results: Vec<Destination>,
    },
}

/// What: A provider backed by one HTTP endpoint returning JSON.
///
/// Inputs:
/// - `name`: Label used in logs.
/// - `url_template`: Endpoint URL with optional `{lat}`, `{lon}`, `{query}` placeholders.
///
/// Details:
/// - Transport failures and non-2xx statuses map to `Network`, client timeouts to
///   `Timeout`, undecodable bodies to `MalformedResponse`.
/// - One instance may serve several capabilities; each call only substitutes the
///   placeholders relevant to it.
#[derive(Debug, Clone)]
pub struct HttpJsonProvider {
    /// Label used in logs.
    name: String,
    /// Endpoint template.
    url_template: String,
    /// Per-request budget.
    timeout: Duration,
    /// HTTP client.
    client: reqwest::Client,
}

impl HttpJsonProvider {
    /// Build a provider using the shared client and a 5s request budget.
    #[must_use]
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
            timeout: Duration::from_secs(5),
            client: shared_client(),
        }
    }

    /// Override the per-request budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint template as configured.
    #[must_use]
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// What: Fill the URL template.
    ///
    /// Inputs:
    /// - `coordinates`: Substituted for `{lat}`/`{lon}` (six decimals) when present.
    /// - `query`: Percent-encoded and substituted for `{query}` when present.
    fn render_url(&self, coordinates: Option<Coordinates>, query: Option<&str>) -> String {
        let mut url = self.url_template.clone();
        if let Some(c) = coordinates {
            url = url
                .replace("{lat}", &format!("{:.6}", c.lat))
                .replace("{lon}", &format!("{:.6}", c.lon));
        }
        if let Some(q) = query {
            url = url.replace("{query}", &percent_encode(q));
        }
        url
    }

    /// What: GET `url` and decode the JSON body as `T`.
    async fn fetch_json<T: DeserializeOwned>(&self, url: String) -> ProviderResult<T> {
        tracing::debug!(provider = %self.name, %url, "provider request");
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.map_transport_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Network(format!("HTTP {status}")));
        }
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(&e))?;
        serde_json::from_str(&body).map_err(|e| ResolveError::MalformedResponse(e.to_string()))
    }

    /// Classify a reqwest failure.
    fn map_transport_error(&self, e: &reqwest::Error) -> ResolveError {
        if e.is_timeout() {
            ResolveError::Timeout(self.timeout)
        } else if e.is_decode() {
            ResolveError::MalformedResponse(e.to_string())
        } else {
            ResolveError::Network(e.to_string())
        }
    }
}

impl GeocodingProvider for HttpJsonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn reverse_geocode(&self, coordinates: Coordinates) -> BoxFuture<'_, ProviderResult<PlaceName>> {
        let url = self.render_url(Some(coordinates), None);
        self.fetch_json(url).boxed()
    }
}

impl IpLocationProvider for HttpJsonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self) -> BoxFuture<'_, ProviderResult<IpLocation>> {
        let url = self.render_url(None, None);
        self.fetch_json(url).boxed()
    }
}

impl DestinationSearchProvider for HttpJsonProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn search(&self, query: String) -> BoxFuture<'_, ProviderResult<Vec<Destination>>> {
        let url = self.render_url(None, Some(&query));
        async move {
            let body: DestinationsBody = self.fetch_json(url).await?;
            Ok(match body {
                DestinationsBody::List(items) | DestinationsBody::Wrapped { results: items } => {
                    items
                }
            })
        }
        .boxed()
    }
}

/// What: Percent-encode a string for use in URLs according to RFC 3986.
///
/// Details:
/// - Unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `.`, `_`, `~`) are left as-is.
/// - Space is encoded as `%20` (not `+`); every other byte as `%XX`.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push_str("%20"),
            _ => {
                out.push('%');
                let _ = write!(out, "{b:02X}");
            }
        }
    }
    out
}
