//! Content retrieval with a rendering-proxy primary path and a direct-GET
//! fallback.
//!
//! The proxy renders JavaScript before returning the page, which most of the
//! monitored listing sites need. A proxy failure is never surfaced on its
//! own: it triggers exactly one direct-fetch attempt, and only when both
//! paths fail does the caller see an error.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;

use rentwatch_core::FetchPath;

use crate::error::FetchError;

/// Extra time granted to the proxy on top of the platform timeout, covering
/// queueing and render overhead on the provider's side.
const PROXY_TIMEOUT_MARGIN_MS: u64 = 5_000;

const BROWSER_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Rendering-proxy settings. Present only when an API key is configured;
/// absent settings route every fetch straight to the direct path.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Milliseconds the proxy lets client-side rendering settle.
    pub wait_ms: u64,
}

impl ProxyConfig {
    /// Proxy settings from the app config; `None` when no API key is set.
    #[must_use]
    pub fn from_app_config(config: &rentwatch_core::AppConfig) -> Option<Self> {
        config.proxy_api_key.as_ref().map(|api_key| Self {
            endpoint: config.proxy_endpoint.clone(),
            api_key: api_key.clone(),
            wait_ms: config.proxy_wait_ms,
        })
    }
}

/// A fetched page body plus which path produced it, so callers and tests can
/// tell a proxy render from a direct fetch instead of inferring it from logs.
#[derive(Debug)]
pub struct FetchedPage {
    pub html: String,
    pub via: FetchPath,
    /// The swallowed primary-path error, when the fallback served this page.
    pub proxy_error: Option<String>,
}

pub struct ContentFetcher {
    client: Client,
    proxy: Option<ProxyConfig>,
}

impl ContentFetcher {
    /// Builds a fetcher. Per-request timeouts come from the platform config,
    /// so the shared client only carries a connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(proxy: Option<ProxyConfig>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, proxy })
    }

    /// Retrieve the raw HTML for `url`, proxy first when configured, direct
    /// otherwise or on proxy failure.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] only when every attempted path failed; a
    /// primary-path failure alone is recorded in
    /// [`FetchedPage::proxy_error`], not surfaced.
    pub async fn fetch(
        &self,
        url: &str,
        timeout_ms: u64,
        request_headers: &BTreeMap<String, String>,
        wait_for_selector: Option<&str>,
    ) -> Result<FetchedPage, FetchError> {
        if let Some(proxy) = &self.proxy {
            tracing::debug!(target_url = url, via = %FetchPath::Proxy, "fetch_started");
            match self
                .fetch_via_proxy(proxy, url, timeout_ms, wait_for_selector)
                .await
            {
                Ok(html) => {
                    return Ok(FetchedPage {
                        html,
                        via: FetchPath::Proxy,
                        proxy_error: None,
                    })
                }
                Err(err) => {
                    tracing::warn!(target_url = url, error = %err, "fetch_fallback");
                    let html = self.fetch_direct(url, timeout_ms, request_headers).await?;
                    return Ok(FetchedPage {
                        html,
                        via: FetchPath::Direct,
                        proxy_error: Some(err.to_string()),
                    });
                }
            }
        }

        tracing::debug!(target_url = url, via = %FetchPath::Direct, "fetch_started");
        let html = self.fetch_direct(url, timeout_ms, request_headers).await?;
        Ok(FetchedPage {
            html,
            via: FetchPath::Direct,
            proxy_error: None,
        })
    }

    async fn fetch_via_proxy(
        &self,
        proxy: &ProxyConfig,
        url: &str,
        timeout_ms: u64,
        wait_for_selector: Option<&str>,
    ) -> Result<String, FetchError> {
        let request_url = Self::proxy_url(proxy, url, timeout_ms, wait_for_selector)?;

        let response = self
            .client
            .get(request_url)
            .timeout(Duration::from_millis(
                timeout_ms.saturating_add(PROXY_TIMEOUT_MARGIN_MS),
            ))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Report the endpoint, not the full request URL — the query
            // string carries the API key.
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: proxy.endpoint.clone(),
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_direct(
        &self,
        url: &str,
        timeout_ms: u64,
        request_headers: &BTreeMap<String, String>,
    ) -> Result<String, FetchError> {
        // Accept-Encoding is set by reqwest itself (gzip feature) so the
        // response body is transparently decompressed before parsing.
        let mut request = self
            .client
            .get(url)
            .timeout(Duration::from_millis(timeout_ms))
            .header(reqwest::header::USER_AGENT, BROWSER_UA)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "nl-NL,nl;q=0.9,en;q=0.8")
            .header(reqwest::header::CONNECTION, "keep-alive")
            .header("Upgrade-Insecure-Requests", "1");

        for (name, value) in request_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }

    /// Builds the proxy request URL: API key, target URL, JS-render flag,
    /// render wait, optional wait-for selector, and the proxy-side timeout.
    fn proxy_url(
        proxy: &ProxyConfig,
        target_url: &str,
        timeout_ms: u64,
        wait_for_selector: Option<&str>,
    ) -> Result<reqwest::Url, FetchError> {
        let mut url =
            reqwest::Url::parse(&proxy.endpoint).map_err(|e| FetchError::InvalidUrl {
                url: proxy.endpoint.clone(),
                reason: e.to_string(),
            })?;

        url.query_pairs_mut()
            .append_pair("api_key", &proxy.api_key)
            .append_pair("url", target_url)
            .append_pair("render_js", "true")
            .append_pair("wait", &proxy.wait_ms.to_string())
            .append_pair("timeout", &timeout_ms.to_string());

        if let Some(selector) = wait_for_selector {
            url.query_pairs_mut()
                .append_pair("wait_for_selector", selector);
        }

        Ok(url)
    }
}
