use crate::error::AppError;
use crate::storage::Backend;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

pub const THEME_KEY: &str = "theme";

/// Display preference, stored next to the task records but never read by
/// the state store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps loose theme names onto a [`Theme`].
///
/// Case and punctuation are ignored, so `Dark-Mode`, `dark_mode` and
/// `darkmode` are the same name.
pub fn canonical_theme_name(raw: &str) -> Option<Theme> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect();

    match cleaned.as_str() {
        "light" | "lightmode" | "day" => Some(Theme::Light),
        "dark" | "darkmode" | "night" => Some(Theme::Dark),
        _ => None,
    }
}

/// Reads the stored preference. Anything other than `light` reads as dark.
pub fn load_theme<B: Backend + ?Sized>(backend: &B) -> Result<Theme, AppError> {
    let stored = backend.get(THEME_KEY)?;
    Ok(match stored.as_deref() {
        Some("light") => Theme::Light,
        _ => Theme::Dark,
    })
}

pub fn save_theme<B: Backend + ?Sized>(backend: &mut B, theme: Theme) -> Result<(), AppError> {
    backend.set(THEME_KEY, theme.as_str())?;
    info!(theme = %theme, "theme saved");
    Ok(())
}

pub fn toggle_theme<B: Backend + ?Sized>(backend: &mut B) -> Result<Theme, AppError> {
    let next = load_theme(&*backend)?.toggled();
    save_theme(backend, next)?;
    Ok(next)
}
