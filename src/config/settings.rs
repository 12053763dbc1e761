//! Operator preferences: hotfolder, output directory, overwrite behavior

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Persisted next to the catalog in `settings.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Watched prepress directory renamed files are dropped into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotfolder: Option<PathBuf>,
    /// Where `rename` writes when no hotfolder is requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Replace files that already exist at the target
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hotfolder: None,
            output_dir: None,
            overwrite: false,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings from JSON file or create default
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Settings file not found, creating default settings at {:?}", path);
            let settings = Settings::default();
            settings.save(path)?;
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;
        Ok(settings)
    }

    /// Load without creating anything on disk; used before logging is set up
    pub fn peek(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
