//! Application Configuration
//!
//! User settings stored in TOML format. Every section falls back to its
//! defaults, so a partial file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::CaptureConfig;
use crate::geometry::Size;
use crate::overlay::OverlayConfig;
use crate::session::DetectionConfig;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Capture settings
    pub capture: CaptureConfig,
    /// Detection cycle settings
    pub detection: DetectionConfig,
    /// Overlay settings
    pub overlay: OverlayConfig,
    /// Preview view settings
    pub view: ViewConfig,
}

/// Measured size of the preview view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl ViewConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write config {:?}", path))?;
    Ok(())
}

/// Default location of the configuration file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(crate::storage::get_config_dir()?.join("config.toml"))
}
