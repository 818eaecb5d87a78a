//! Batch runner: one executor call per platform, concurrently.
//!
//! The concurrency bound is caller policy — the executor itself imposes no
//! rate limit. Per-platform failures land in their own outcome, never abort
//! the sweep.

use futures::stream::{self, StreamExt};

use rentwatch_core::{AlertKind, PlatformConfig, ScrapeOutcome};

use crate::executor::ScrapeExecutor;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SweepEntry {
    pub platform: String,
    pub outcome: ScrapeOutcome,
    /// Derived by inspecting the outcome against the platform threshold;
    /// `None` means healthy.
    pub alert: Option<AlertKind>,
}

/// Scrape every platform, at most `max_concurrent` in flight at once.
/// Entries come back in completion order; callers needing a fixed order
/// should sort by platform name.
pub async fn run_sweep(
    executor: &ScrapeExecutor,
    platforms: &[PlatformConfig],
    max_concurrent: usize,
) -> Vec<SweepEntry> {
    stream::iter(platforms.iter())
        .map(|platform| scrape_one(executor, platform))
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await
}

async fn scrape_one(executor: &ScrapeExecutor, platform: &PlatformConfig) -> SweepEntry {
    let outcome = executor.run(platform).await;
    let alert = AlertKind::classify(&outcome, platform.expected_min_listings);
    if let Some(kind) = alert {
        tracing::warn!(
            platform = %platform.name,
            alert = %kind,
            listings = outcome.listings_found,
            expected_min = platform.expected_min_listings,
            "alert_raised"
        );
    }
    SweepEntry {
        platform: platform.name.clone(),
        outcome,
        alert,
    }
}
