//! Window configuration.

use cgmath::Vector2;
use perch_core::{Color, Size};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config has syntax error")]
    Parse(#[from] toml::de::Error),
}

/// A window size in points.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl From<WindowSize> for Size {
    fn from(size: WindowSize) -> Size {
        Vector2::new(size.width, size.height)
    }
}

/// Initial window settings.
///
/// ```toml
/// title = "Egg Timer"
/// size = { width = 400, height = 600 }
/// status_color = "#3f51b5"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub size: Option<WindowSize>,
    pub min_size: Option<WindowSize>,
    pub max_size: Option<WindowSize>,
    pub fullscreen: bool,
    /// Color of the system status bar, where the platform has one.
    pub status_color: Option<String>,
    /// Color of the system navigation bar, where the platform has one.
    pub navigation_color: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "perch".into(),
            size: None,
            min_size: None,
            max_size: None,
            fullscreen: false,
            status_color: None,
            navigation_color: None,
        }
    }
}

impl WindowConfig {
    pub fn from_toml_str(text: &str) -> Result<WindowConfig, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<WindowConfig, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = WindowConfig::from_toml_str(&text)?;
        debug!(path = %path.display(), title = %config.title, "loaded window config");
        Ok(config)
    }

    pub fn status_color(&self) -> Option<Color> {
        parse_color("status_color", self.status_color.as_deref())
    }

    pub fn navigation_color(&self) -> Option<Color> {
        parse_color("navigation_color", self.navigation_color.as_deref())
    }

    /// The size to open the window at, clamped to the minimum and maximum sizes.
    pub fn initial_size(&self) -> Option<Size> {
        let mut size: Size = self.size?.into();
        if let Some(min) = self.min_size {
            size.x = size.x.max(min.width);
            size.y = size.y.max(min.height);
        }
        if let Some(max) = self.max_size {
            size.x = size.x.min(max.width);
            size.y = size.y.min(max.height);
        }
        Some(size)
    }
}

fn parse_color(key: &str, value: Option<&str>) -> Option<Color> {
    let value = value?;
    let color = Color::parse(value);
    if color.is_none() {
        warn!(key, value, "ignoring invalid color");
    }
    color
}
