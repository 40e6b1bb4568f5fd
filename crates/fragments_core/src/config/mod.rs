use crate::error::AppError;
use crate::stats::MAX_CHART_DAYS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR_NAME: &str = "fragments";
const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "FRAGMENTS_CONFIG_PATH";

pub const DEFAULT_RECENT_LIMIT: usize = 5;
pub const DEFAULT_CHART_DAYS: u32 = 7;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub recent_limit: Option<usize>,
    #[serde(default)]
    pub chart_days: Option<u32>,
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Config {
    pub fn recent_limit(&self) -> usize {
        self.recent_limit.unwrap_or(DEFAULT_RECENT_LIMIT)
    }

    pub fn chart_days(&self) -> u32 {
        self.chart_days.unwrap_or(DEFAULT_CHART_DAYS)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub store_path: Option<PathBuf>,
    pub recent_limit: Option<usize>,
    pub chart_days: Option<u32>,
    pub log_filter: Option<String>,
}

/// Per-user directory holding both the config file and the default store.
pub fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(APP_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

/// Never fails: a broken or unreachable config degrades to defaults and the
/// cause is handed back for the caller to report.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "config ignored");
            ConfigLoad {
                config: Config::default(),
                error: Some(err),
            }
        }
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    validate_config(&config)?;
    Ok(normalize_config(config))
}

pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if let Some(days) = config.chart_days
        && days > MAX_CHART_DAYS
    {
        return Err(AppError::validation(format!(
            "chart_days must be at most {MAX_CHART_DAYS}, got {days}"
        )));
    }
    Ok(())
}

fn normalize_config(mut config: Config) -> Config {
    config.store_path = config
        .store_path
        .filter(|path| !path.as_os_str().is_empty());
    config.log_filter = config
        .log_filter
        .map(|filter| filter.trim().to_string())
        .filter(|filter| !filter.is_empty());
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path = Some(path.clone());
    }
    if let Some(limit) = overrides.recent_limit {
        merged.recent_limit = Some(limit);
    }
    if let Some(days) = overrides.chart_days {
        merged.chart_days = Some(days);
    }
    if let Some(filter) = overrides.log_filter.as_ref() {
        merged.log_filter = Some(filter.clone());
    }

    normalize_config(merged)
}
