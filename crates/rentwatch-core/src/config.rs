use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let bind_addr = parse_addr("RENTWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("RENTWATCH_LOG_LEVEL", "info");
    let platforms_path = PathBuf::from(or_default(
        "RENTWATCH_PLATFORMS_PATH",
        "./config/platforms.yaml",
    ));

    let proxy_api_key = lookup("RENTWATCH_PROXY_API_KEY")
        .ok()
        .filter(|s| !s.trim().is_empty());
    let proxy_endpoint = or_default(
        "RENTWATCH_PROXY_ENDPOINT",
        "https://app.scrapingbee.com/api/v1/",
    );
    let proxy_wait_ms = parse_u64("RENTWATCH_PROXY_WAIT_MS", "3000")?;

    let max_concurrent_scrapes = parse_usize("RENTWATCH_MAX_CONCURRENT_SCRAPES", "4")?;
    if max_concurrent_scrapes == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "RENTWATCH_MAX_CONCURRENT_SCRAPES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    // Six-field cron (with seconds), every 15 minutes by default.
    let sweep_cron = or_default("RENTWATCH_SWEEP_CRON", "0 */15 * * * *");

    Ok(AppConfig {
        bind_addr,
        log_level,
        platforms_path,
        proxy_api_key,
        proxy_endpoint,
        proxy_wait_ms,
        max_concurrent_scrapes,
        sweep_cron,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(
            cfg.platforms_path.to_string_lossy(),
            "./config/platforms.yaml"
        );
        assert!(cfg.proxy_api_key.is_none());
        assert_eq!(cfg.proxy_endpoint, "https://app.scrapingbee.com/api/v1/");
        assert_eq!(cfg.proxy_wait_ms, 3000);
        assert_eq!(cfg.max_concurrent_scrapes, 4);
        assert_eq!(cfg.sweep_cron, "0 */15 * * * *");
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTWATCH_BIND_ADDR"),
            "expected InvalidEnvVar(RENTWATCH_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_proxy_api_key_set() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_PROXY_API_KEY", "sk-test-123");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.proxy_api_key.as_deref(), Some("sk-test-123"));
    }

    #[test]
    fn build_app_config_blank_proxy_api_key_treated_as_unset() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_PROXY_API_KEY", "   ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.proxy_api_key.is_none());
    }

    #[test]
    fn build_app_config_proxy_wait_ms_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_PROXY_WAIT_MS", "5000");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.proxy_wait_ms, 5000);
    }

    #[test]
    fn build_app_config_proxy_wait_ms_invalid() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_PROXY_WAIT_MS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTWATCH_PROXY_WAIT_MS"),
            "expected InvalidEnvVar(RENTWATCH_PROXY_WAIT_MS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_max_concurrent_scrapes_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_MAX_CONCURRENT_SCRAPES", "8");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.max_concurrent_scrapes, 8);
    }

    #[test]
    fn build_app_config_rejects_zero_concurrency() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_MAX_CONCURRENT_SCRAPES", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "RENTWATCH_MAX_CONCURRENT_SCRAPES"),
            "expected InvalidEnvVar(RENTWATCH_MAX_CONCURRENT_SCRAPES), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_sweep_cron_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_SWEEP_CRON", "0 0 * * * *");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.sweep_cron, "0 0 * * * *");
    }

    #[test]
    fn app_config_debug_redacts_proxy_api_key() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("RENTWATCH_PROXY_API_KEY", "sk-very-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("sk-very-secret"), "key leaked: {debug}");
        assert!(debug.contains("[redacted]"));
    }
}
