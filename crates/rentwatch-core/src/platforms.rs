use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{ConfigError, DEFAULT_TIMEOUT_MS};

/// One monitored listing platform: the target URL, the ordered candidate
/// selectors to try against it, and the alerting threshold.
///
/// `candidate_selectors` order matters — it acts as priority when two
/// selectors match the same number of elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub name: String,
    pub url: String,
    /// Accepts either a YAML list or the legacy comma-joined string form;
    /// the string form is split by [`parse_selector_list`] on load.
    #[serde(
        alias = "selector",
        rename = "selectors",
        deserialize_with = "deserialize_selectors"
    )]
    pub candidate_selectors: Vec<String>,
    #[serde(default)]
    pub expected_min_listings: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Extra request headers for the direct-fetch path. May be empty.
    #[serde(default, rename = "headers")]
    pub request_headers: BTreeMap<String, String>,
    /// Selector the rendering proxy should wait for before returning the
    /// page. Falls back to the first candidate selector when unset.
    #[serde(default)]
    pub wait_for_selector: Option<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

#[derive(Debug, Deserialize)]
pub struct PlatformsFile {
    pub platforms: Vec<PlatformConfig>,
}

/// Split a comma-joined selector field into an ordered candidate list,
/// trimming whitespace and dropping empty entries.
#[must_use]
pub fn parse_selector_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorsField {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_selectors<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field = SelectorsField::deserialize(deserializer)?;
    let selectors = match field {
        SelectorsField::Joined(raw) => parse_selector_list(&raw),
        SelectorsField::List(list) => list
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect(),
    };
    Ok(selectors)
}

/// Load and validate the platform registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_platforms(path: &Path) -> Result<PlatformsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let platforms_file: PlatformsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::PlatformsFileParse)?;

    validate_platforms(&platforms_file)?;

    Ok(platforms_file)
}

fn validate_platforms(platforms_file: &PlatformsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for platform in &platforms_file.platforms {
        if platform.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "platform name must be non-empty".to_string(),
            ));
        }

        let lower_name = platform.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform name: '{}'",
                platform.name
            )));
        }

        if !platform.url.starts_with("http://") && !platform.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "platform '{}' has non-absolute url '{}'",
                platform.name, platform.url
            )));
        }

        if platform.candidate_selectors.is_empty() {
            return Err(ConfigError::Validation(format!(
                "platform '{}' must define at least one candidate selector",
                platform.name
            )));
        }

        if platform.timeout_ms == 0 {
            return Err(ConfigError::Validation(format!(
                "platform '{}' has zero timeout_ms",
                platform.name
            )));
        }
    }

    Ok(())
}
