//! Storage Layer
//!
//! Platform directories for configuration and saved result stills.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use uuid::Uuid;

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "qroverlay", "QrOverlay")
        .ok_or_else(|| anyhow::anyhow!("Could not determine project directories"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;
    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;
    Ok(config_dir)
}

/// Write the frozen frame of a cycle as `result_<cycle>.png` under `dir`
pub fn save_result_image(image: &RgbaImage, dir: &Path, cycle: Uuid) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    let path = dir.join(format!("result_{}.png", cycle.simple()));
    image
        .save(&path)
        .with_context(|| format!("Failed to save result image {:?}", path))?;
    Ok(path)
}
