use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which fetch path produced the page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPath {
    /// Rendering proxy (JavaScript executed by the provider).
    Proxy,
    /// Plain HTTP GET with browser-like headers.
    Direct,
}

impl std::fmt::Display for FetchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchPath::Proxy => write!(f, "proxy"),
            FetchPath::Direct => write!(f, "direct"),
        }
    }
}

/// The structured result of one scrape attempt. This is the exact record the
/// external result sink persists, hence the camelCase wire names.
///
/// Invariants, upheld by the constructors:
/// - `success == false` implies `listings_found == 0` and an empty
///   `content_hash`.
/// - `success == true` implies `error_message` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub success: bool,
    pub listings_found: u32,
    #[serde(rename = "htmlHash")]
    pub content_hash: String,
    pub selector_used: String,
    #[serde(rename = "responseTime")]
    pub response_time_ms: u64,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none", default)]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fetched_via: Option<FetchPath>,
}

impl ScrapeOutcome {
    /// A successful scrape. The timestamp is taken at construction.
    #[must_use]
    pub fn succeeded(
        listings_found: u32,
        content_hash: String,
        selector_used: String,
        response_time_ms: u64,
        fetched_via: FetchPath,
    ) -> Self {
        Self {
            success: true,
            listings_found,
            content_hash,
            selector_used,
            response_time_ms,
            error_message: None,
            timestamp: Utc::now(),
            fetched_via: Some(fetched_via),
        }
    }

    /// A failed scrape. Count and hash are forced to their empty values so
    /// the failure invariant cannot be violated by callers.
    #[must_use]
    pub fn failed(error_message: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            success: false,
            listings_found: 0,
            content_hash: String::new(),
            selector_used: String::new(),
            response_time_ms,
            error_message: Some(error_message.into()),
            timestamp: Utc::now(),
            fetched_via: None,
        }
    }
}

/// Alert category derived from an outcome by the caller — not by the
/// executor itself, which only reports what it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ScrapeFailure,
    NoListings,
    LowListings,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertKind::ScrapeFailure => write!(f, "scrape_failure"),
            AlertKind::NoListings => write!(f, "no_listings"),
            AlertKind::LowListings => write!(f, "low_listings"),
        }
    }
}

impl AlertKind {
    /// Classify an outcome against the platform's expected minimum.
    ///
    /// "Fetched fine but found nothing" is a successful outcome that still
    /// alerts — it usually means a broken selector, not broken infrastructure.
    #[must_use]
    pub fn classify(outcome: &ScrapeOutcome, expected_min_listings: u32) -> Option<Self> {
        if !outcome.success {
            return Some(AlertKind::ScrapeFailure);
        }
        if outcome.listings_found == 0 {
            return Some(AlertKind::NoListings);
        }
        if outcome.listings_found < expected_min_listings {
            return Some(AlertKind::LowListings);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_outcome_upholds_invariants() {
        let outcome = ScrapeOutcome::failed("connection refused", 120);
        assert!(!outcome.success);
        assert_eq!(outcome.listings_found, 0);
        assert!(outcome.content_hash.is_empty());
        assert!(outcome.selector_used.is_empty());
        assert_eq!(outcome.error_message.as_deref(), Some("connection refused"));
        assert!(outcome.fetched_via.is_none());
    }

    #[test]
    fn successful_outcome_has_no_error() {
        let outcome = ScrapeOutcome::succeeded(
            12,
            "abc123".to_string(),
            ".search-result".to_string(),
            850,
            FetchPath::Proxy,
        );
        assert!(outcome.success);
        assert!(outcome.error_message.is_none());
        assert_eq!(outcome.fetched_via, Some(FetchPath::Proxy));
    }

    #[test]
    fn outcome_serializes_to_sink_record_shape() {
        let outcome = ScrapeOutcome::succeeded(
            3,
            "deadbeef".to_string(),
            ".listing".to_string(),
            400,
            FetchPath::Direct,
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["listingsFound"], 3);
        assert_eq!(json["htmlHash"], "deadbeef");
        assert_eq!(json["selectorUsed"], ".listing");
        assert_eq!(json["responseTime"], 400);
        assert_eq!(json["fetchedVia"], "direct");
        assert!(json.get("error").is_none(), "success must omit error field");
    }

    #[test]
    fn failed_outcome_serializes_error_field() {
        let outcome = ScrapeOutcome::failed("HTTP 500", 90);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "HTTP 500");
        assert_eq!(json["htmlHash"], "");
        assert!(json.get("fetchedVia").is_none());
    }

    #[test]
    fn classify_failure_wins_over_thresholds() {
        let outcome = ScrapeOutcome::failed("timeout", 30_000);
        assert_eq!(
            AlertKind::classify(&outcome, 0),
            Some(AlertKind::ScrapeFailure)
        );
    }

    #[test]
    fn classify_zero_listings() {
        let outcome = ScrapeOutcome::succeeded(
            0,
            "hash".to_string(),
            ".last-tried".to_string(),
            100,
            FetchPath::Direct,
        );
        assert_eq!(AlertKind::classify(&outcome, 5), Some(AlertKind::NoListings));
    }

    #[test]
    fn classify_low_listings() {
        let outcome = ScrapeOutcome::succeeded(
            2,
            "hash".to_string(),
            ".listing".to_string(),
            100,
            FetchPath::Direct,
        );
        assert_eq!(
            AlertKind::classify(&outcome, 5),
            Some(AlertKind::LowListings)
        );
    }

    #[test]
    fn classify_healthy_outcome_is_none() {
        let outcome = ScrapeOutcome::succeeded(
            20,
            "hash".to_string(),
            ".listing".to_string(),
            100,
            FetchPath::Proxy,
        );
        assert_eq!(AlertKind::classify(&outcome, 5), None);
    }
}
