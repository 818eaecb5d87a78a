mod api;
mod middleware;
mod scheduler;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use rentwatch_scraper::{ContentFetcher, ProxyConfig, ScrapeExecutor};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = rentwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let platforms_file = rentwatch_core::load_platforms(&config.platforms_path)?;
    tracing::info!(
        platforms = platforms_file.platforms.len(),
        path = %config.platforms_path.display(),
        "platform registry loaded"
    );

    let proxy = ProxyConfig::from_app_config(&config);
    let proxy_configured = proxy.is_some();
    if !proxy_configured {
        tracing::warn!("no rendering-proxy API key configured; every fetch uses the direct path");
    }

    let executor = Arc::new(ScrapeExecutor::new(proxy.clone())?);
    let fetcher = Arc::new(ContentFetcher::new(proxy)?);

    let state = AppState {
        executor,
        fetcher,
        platforms: Arc::new(platforms_file.platforms),
        latest: Arc::new(RwLock::new(HashMap::new())),
        max_concurrent_scrapes: config.max_concurrent_scrapes,
        proxy_configured,
    };

    let _scheduler = scheduler::build_scheduler(state.clone(), &config.sweep_cron).await?;

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "rentwatch server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
