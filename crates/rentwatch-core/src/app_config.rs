use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub platforms_path: PathBuf,
    /// API key for the rendering proxy. `None` disables the primary fetch
    /// path entirely; every scrape then goes straight to the direct fetch.
    pub proxy_api_key: Option<String>,
    pub proxy_endpoint: String,
    /// Milliseconds the rendering proxy should let client-side rendering
    /// settle before returning the page.
    pub proxy_wait_ms: u64,
    pub max_concurrent_scrapes: usize,
    pub sweep_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("platforms_path", &self.platforms_path)
            .field(
                "proxy_api_key",
                &self.proxy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("proxy_endpoint", &self.proxy_endpoint)
            .field("proxy_wait_ms", &self.proxy_wait_ms)
            .field("max_concurrent_scrapes", &self.max_concurrent_scrapes)
            .field("sweep_cron", &self.sweep_cron)
            .finish()
    }
}
