//! Configuration management for hotfolder-rename
//!
//! Two JSON files live in the config directory:
//! - **catalog**: machines, products and papers used for code lookups
//! - **settings**: hotfolder location and output preferences

pub mod catalog;
pub mod settings;

use std::path::{Path, PathBuf};

use crate::constants::config::{APP_DIR, CATALOG_FILENAME, SETTINGS_FILENAME};

// Re-export commonly used types
pub use catalog::{Catalog, Category, ConfigEntry, EntryUpdate};
pub use settings::Settings;

/// Locations of the config files
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    dir: PathBuf,
}

impl ConfigPaths {
    /// `override_dir` wins, otherwise the platform config dir
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        let dir = override_dir.unwrap_or_else(|| {
            let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(APP_DIR);
            path
        });
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog(&self) -> PathBuf {
        self.dir.join(CATALOG_FILENAME)
    }

    pub fn settings(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILENAME)
    }
}
