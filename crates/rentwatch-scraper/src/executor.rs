//! The one `PlatformConfig -> ScrapeOutcome` operation: fetch, hash,
//! evaluate, time.
//!
//! Batch callers run many of these concurrently; a failure here must never
//! abort a batch, so `run` is infallible — every failure path folds into an
//! outcome with `success = false`.

use std::time::Instant;

use sha2::{Digest, Sha256};

use rentwatch_core::{PlatformConfig, ScrapeOutcome};

use crate::error::FetchError;
use crate::evaluate::evaluate;
use crate::fetch::{ContentFetcher, ProxyConfig};

pub struct ScrapeExecutor {
    fetcher: ContentFetcher,
}

impl ScrapeExecutor {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(proxy: Option<ProxyConfig>) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: ContentFetcher::new(proxy)?,
        })
    }

    /// Run one scrape. Holds no state across calls; the returned outcome is
    /// the only artifact.
    pub async fn run(&self, platform: &PlatformConfig) -> ScrapeOutcome {
        let started = Instant::now();

        let wait_hint = platform
            .wait_for_selector
            .as_deref()
            .or_else(|| platform.candidate_selectors.first().map(String::as_str));

        match self
            .fetcher
            .fetch(
                &platform.url,
                platform.timeout_ms,
                &platform.request_headers,
                wait_hint,
            )
            .await
        {
            Ok(page) => {
                let content_hash = hash_content(&page.html);
                let evaluation = evaluate(&page.html, &platform.candidate_selectors);
                let response_time_ms = elapsed_ms(started);
                tracing::info!(
                    platform = %platform.name,
                    listings = evaluation.listings_found,
                    selector = %evaluation.selector_used,
                    via = %page.via,
                    response_time_ms,
                    "outcome_ready"
                );
                ScrapeOutcome::succeeded(
                    evaluation.listings_found,
                    content_hash,
                    evaluation.selector_used,
                    response_time_ms,
                    page.via,
                )
            }
            Err(err) => {
                let response_time_ms = elapsed_ms(started);
                tracing::warn!(
                    platform = %platform.name,
                    error = %err,
                    response_time_ms,
                    "outcome_ready"
                );
                ScrapeOutcome::failed(err.to_string(), response_time_ms)
            }
        }
    }
}

/// Deterministic digest of the raw body, lowercase hex. The result sink
/// compares these across runs to detect markup changes; the executor itself
/// never compares.
fn hash_content(html: &str) -> String {
    format!("{:x}", Sha256::digest(html.as_bytes()))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_content_is_deterministic() {
        let body = "<html><body><div class=\"listing\">x</div></body></html>";
        assert_eq!(hash_content(body), hash_content(body));
    }

    #[test]
    fn hash_content_is_lowercase_hex_sha256() {
        let hash = hash_content("");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // SHA-256 of the empty string.
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn hash_content_differs_for_different_bodies() {
        assert_ne!(hash_content("<html>a</html>"), hash_content("<html>b</html>"));
    }
}
