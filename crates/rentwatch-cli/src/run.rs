//! Command handlers for the CLI.
//!
//! These are called from `main` after the config is established. Per-platform
//! scrape failures land inside their own outcome record rather than aborting
//! the run, so one broken platform never hides the others.

use std::collections::BTreeMap;

use rentwatch_core::{AppConfig, PlatformConfig, DEFAULT_TIMEOUT_MS};
use rentwatch_scraper::{
    diagnose_selector, run_sweep, ContentFetcher, ProxyConfig, ScrapeExecutor,
};

/// Load the platforms to process for a run.
///
/// If `platform_filter` is `Some(name)`, resolves that single platform and
/// returns an error if not found. If `None`, returns the whole registry.
fn load_platforms_for_run(
    config: &AppConfig,
    platform_filter: Option<&str>,
) -> anyhow::Result<Vec<PlatformConfig>> {
    let registry = rentwatch_core::load_platforms(&config.platforms_path)?;

    match platform_filter {
        Some(name) => {
            let platform = registry
                .platforms
                .into_iter()
                .find(|p| p.name.eq_ignore_ascii_case(name))
                .ok_or_else(|| anyhow::anyhow!("platform '{name}' not found in registry"))?;
            Ok(vec![platform])
        }
        None => Ok(registry.platforms),
    }
}

/// Scrape the selected platforms and print one outcome record per platform.
///
/// When `dry_run` is `true` the function prints what would be scraped and
/// returns without touching the network.
///
/// # Errors
///
/// Returns an error if the platform filter resolves to nothing or the
/// executor cannot be constructed. Scrape failures are reported inside the
/// printed outcome records, not propagated.
pub(crate) async fn run_scrapes(
    config: &AppConfig,
    platform_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let platforms = load_platforms_for_run(config, platform_filter)?;

    if dry_run {
        let names: Vec<&str> = platforms.iter().map(|p| p.name.as_str()).collect();
        println!(
            "dry-run: would scrape {} platforms: [{}]",
            platforms.len(),
            names.join(", ")
        );
        return Ok(());
    }

    let executor = ScrapeExecutor::new(ProxyConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build scrape executor: {e}"))?;

    let mut entries = run_sweep(&executor, &platforms, config.max_concurrent_scrapes).await;
    entries.sort_by(|a, b| a.platform.cmp(&b.platform));

    let alerts = entries.iter().filter(|e| e.alert.is_some()).count();

    for entry in &entries {
        println!("{}", serde_json::to_string_pretty(entry)?);
    }

    if alerts > 0 {
        tracing::warn!(alerts, platforms = entries.len(), "sweep finished with alerts");
    }

    Ok(())
}

/// Fetch `url` once and print the tested selector's count plus the ranked
/// well-known alternatives.
///
/// # Errors
///
/// Returns an error when the page cannot be fetched on any path — there is
/// nothing to diagnose without a body.
pub(crate) async fn run_test_selector(
    config: &AppConfig,
    url: &str,
    selector: &str,
) -> anyhow::Result<()> {
    let fetcher = ContentFetcher::new(ProxyConfig::from_app_config(config))
        .map_err(|e| anyhow::anyhow!("failed to build fetcher: {e}"))?;

    let page = fetcher
        .fetch(url, DEFAULT_TIMEOUT_MS, &BTreeMap::new(), Some(selector))
        .await
        .map_err(|e| anyhow::anyhow!("failed to fetch {url}: {e}"))?;

    let diagnosis = diagnose_selector(&page.html, selector);
    println!("{}", serde_json::to_string_pretty(&diagnosis)?);

    Ok(())
}

/// Print the configured platform registry.
///
/// # Errors
///
/// Returns an error if the registry cannot be loaded or validated.
pub(crate) fn list_platforms(config: &AppConfig) -> anyhow::Result<()> {
    let registry = rentwatch_core::load_platforms(&config.platforms_path)?;

    for platform in &registry.platforms {
        println!(
            "{}  {}  selectors={}  expected_min={}",
            platform.name,
            platform.url,
            platform.candidate_selectors.len(),
            platform.expected_min_listings
        );
    }

    Ok(())
}
