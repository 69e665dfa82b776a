use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the per-directory override file.
pub const LOCAL_CONFIG_FILE: &str = ".librarian.toml";

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub filters: Option<FiltersConfig>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub server_url: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub min_query_chars: Option<usize>,
    pub validate_year_range: Option<bool>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub limit: Option<u32>,
    pub debounce_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub theme: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Platform config directory path: `<config_dir>/librarian/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("librarian").join("config.toml"))
}

/// Load config by cascading CWD `.librarian.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(LOCAL_CONFIG_FILE));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Read one config file. Missing or malformed files yield `None`.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => {
            tracing::debug!(path = %path.display(), "loaded config file");
            Some(cfg)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let api = match (base.api, overlay.api) {
        (Some(b), Some(o)) => Some(ApiConfig {
            server_url: o.server_url.or(b.server_url),
            api_base: o.api_base.or(b.api_base),
            timeout_secs: o.timeout_secs.or(b.timeout_secs),
        }),
        (b, o) => o.or(b),
    };
    let filters = match (base.filters, overlay.filters) {
        (Some(b), Some(o)) => Some(FiltersConfig {
            min_query_chars: o.min_query_chars.or(b.min_query_chars),
            validate_year_range: o.validate_year_range.or(b.validate_year_range),
            sort: o.sort.or(b.sort),
            order: o.order.or(b.order),
            limit: o.limit.or(b.limit),
            debounce_ms: o.debounce_ms.or(b.debounce_ms),
        }),
        (b, o) => o.or(b),
    };
    let display = match (base.display, overlay.display) {
        (Some(b), Some(o)) => Some(DisplayConfig {
            theme: o.theme.or(b.theme),
        }),
        (b, o) => o.or(b),
    };
    ConfigFile {
        api,
        filters,
        display,
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "saved config");
    Ok(())
}
