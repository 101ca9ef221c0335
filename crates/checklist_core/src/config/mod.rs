use crate::error::AppError;
use crate::theme::{Theme, canonical_theme_name};
use crate::view::Filter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_FILE_NAME: &str = "config.json";
pub const CONFIG_ENV_VAR: &str = "CHECKLIST_CONFIG_PATH";

#[derive(Debug, Clone)]
pub struct Palette {
    pub accent: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn accentize(&self, text: &str) -> String {
        if self.accent.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.accent, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            accent: "\x1b[38;5;141m",
            muted: "\x1b[38;5;245m",
            reset: "\x1b[0m",
        },
        Theme::Light => Palette {
            accent: "\x1b[38;5;25m",
            muted: "\x1b[38;5;240m",
            reset: "\x1b[0m",
        },
    }
}

pub fn plain_palette() -> Palette {
    Palette {
        accent: "",
        muted: "",
        reset: "",
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Forces a theme regardless of the stored preference.
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub default_filter: Option<Filter>,
    #[serde(default)]
    pub history_open: Option<bool>,
    #[serde(default)]
    pub store_path: Option<PathBuf>,
}

impl Config {
    pub fn theme(&self) -> Option<Theme> {
        self.theme.as_deref().and_then(canonical_theme_name)
    }

    pub fn filter(&self) -> Filter {
        self.default_filter.unwrap_or_default()
    }

    pub fn history_open(&self) -> bool {
        self.history_open.unwrap_or(true)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub default_filter: Option<Filter>,
    pub history_open: Option<bool>,
    pub store_path: Option<PathBuf>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("checklist")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("checklist")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

pub fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
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
            warn!(path = %path.display(), error = %err, "config unreadable, using defaults");
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

    if let Some(theme) = config.theme.as_deref()
        && canonical_theme_name(theme).is_none()
    {
        return Err(AppError::invalid_data(format!("unknown theme '{theme}'")));
    }

    Ok(config)
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref()
        && canonical_theme_name(theme).is_some()
    {
        merged.theme = Some(theme.clone());
    }
    if overrides.default_filter.is_some() {
        merged.default_filter = overrides.default_filter;
    }
    if overrides.history_open.is_some() {
        merged.history_open = overrides.history_open;
    }
    if let Some(path) = overrides.store_path.as_ref() {
        merged.store_path = Some(path.clone());
    }

    merged
}
