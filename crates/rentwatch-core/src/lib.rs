mod app_config;
mod config;
mod outcome;
mod platforms;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use outcome::{AlertKind, FetchPath, ScrapeOutcome};
pub use platforms::{load_platforms, parse_selector_list, PlatformConfig, PlatformsFile};

/// Default per-platform fetch timeout when the registry does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read platforms file {path}: {source}")]
    PlatformsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse platforms file: {0}")]
    PlatformsFileParse(#[from] serde_yaml::Error),

    #[error("platform config validation failed: {0}")]
    Validation(String),
}
