//! Catalog of machines, products and papers
//!
//! User-editable name/code lists persisted as JSON. The same shape is used for
//! import and export so catalogs can be moved between workstations.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::validation::{validate_entry, ValidationError};

/// One of the three catalog lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Category {
    Machines,
    Products,
    Papers,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Machines, Category::Products, Category::Papers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Machines => "machines",
            Category::Products => "products",
            Category::Papers => "papers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{category}: code '{code}' already exists")]
    DuplicateCode { category: Category, code: String },
    #[error("{category}: no entry with code '{code}'")]
    NotFound { category: Category, code: String },
    #[error("{category}: invalid entry: {source}")]
    InvalidEntry {
        category: Category,
        #[source]
        source: ValidationError,
    },
}

/// A machine, product or paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub code: String,
    /// Paper class for papers (`gestrichen` / `ungestrichen`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
}

impl ConfigEntry {
    pub fn new(name: &str, code: &str, entry_type: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            entry_type: entry_type.map(str::to_string),
        }
    }
}

/// Changes applied by `Catalog::update`; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub entry_type: Option<String>,
}

/// The persisted catalog: `{ machines: [...], products: [...], papers: [...] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub machines: Vec<ConfigEntry>,
    #[serde(default)]
    pub products: Vec<ConfigEntry>,
    #[serde(default)]
    pub papers: Vec<ConfigEntry>,
}

fn default_machines() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new("Heidelberg Speedmaster CX 75", "CX75", None),
        ConfigEntry::new("Heidelberg Speedmaster XL 106", "XL106", None),
        ConfigEntry::new("HP Indigo 12000", "HPI12K", None),
    ]
}

fn default_products() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new("Briefpapier", "BRFPP", None),
        ConfigEntry::new("Visitenkarten", "VIKA", None),
        ConfigEntry::new("Flyer", "FLY", None),
        ConfigEntry::new("Broschüre", "BROS", None),
    ]
}

fn default_papers() -> Vec<ConfigEntry> {
    vec![
        ConfigEntry::new("Normset Satin 170 g/m²", "NoSat170", Some("ungestrichen")),
        ConfigEntry::new("Normset Offset 90 g/m²", "NoOff90", Some("ungestrichen")),
        ConfigEntry::new("Magno Gloss 135 g/m²", "MaGl135", Some("gestrichen")),
        ConfigEntry::new("Magno Matt 300 g/m²", "MaMa300", Some("gestrichen")),
    ]
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            machines: default_machines(),
            products: default_products(),
            papers: default_papers(),
        }
    }
}

impl Catalog {
    pub fn empty() -> Self {
        Self {
            machines: Vec::new(),
            products: Vec::new(),
            papers: Vec::new(),
        }
    }

    pub fn list(&self, category: Category) -> &[ConfigEntry] {
        match category {
            Category::Machines => &self.machines,
            Category::Products => &self.products,
            Category::Papers => &self.papers,
        }
    }

    fn list_mut(&mut self, category: Category) -> &mut Vec<ConfigEntry> {
        match category {
            Category::Machines => &mut self.machines,
            Category::Products => &mut self.products,
            Category::Papers => &mut self.papers,
        }
    }

    /// Entry whose code equals `value`, else whose name matches it ignoring case
    pub fn find(&self, category: Category, value: &str) -> Option<&ConfigEntry> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let entries = self.list(category);
        entries
            .iter()
            .find(|e| e.code == value)
            .or_else(|| entries.iter().find(|e| e.name.to_lowercase() == value.to_lowercase()))
    }

    /// Code for a form value; unknown values pass through unchanged
    pub fn resolve_code(&self, category: Category, value: &str) -> String {
        match self.find(category, value) {
            Some(entry) => entry.code.clone(),
            None => value.trim().to_string(),
        }
    }

    fn check_entry(category: Category, entry: &ConfigEntry) -> Result<(), CatalogError> {
        validate_entry(category, entry).map_err(|source| CatalogError::InvalidEntry { category, source })
    }

    pub fn add(&mut self, category: Category, entry: ConfigEntry) -> Result<(), CatalogError> {
        Self::check_entry(category, &entry)?;
        let entries = self.list_mut(category);
        if entries.iter().any(|e| e.code == entry.code) {
            return Err(CatalogError::DuplicateCode { category, code: entry.code });
        }
        info!(category = %category, code = %entry.code, name = %entry.name, "Added catalog entry");
        entries.push(entry);
        Ok(())
    }

    pub fn update(
        &mut self,
        category: Category,
        code: &str,
        update: EntryUpdate,
    ) -> Result<&ConfigEntry, CatalogError> {
        let entries = self.list_mut(category);
        let idx = entries
            .iter()
            .position(|e| e.code == code)
            .ok_or_else(|| CatalogError::NotFound { category, code: code.to_string() })?;

        let mut updated = entries[idx].clone();
        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(new_code) = update.code {
            if new_code != code && entries.iter().any(|e| e.code == new_code) {
                return Err(CatalogError::DuplicateCode { category, code: new_code });
            }
            updated.code = new_code;
        }
        if let Some(entry_type) = update.entry_type {
            // An empty type clears it
            updated.entry_type = Some(entry_type).filter(|t| !t.trim().is_empty());
        }
        Self::check_entry(category, &updated)?;

        info!(category = %category, old_code = %code, code = %updated.code, "Updated catalog entry");
        let entries = self.list_mut(category);
        entries[idx] = updated;
        Ok(&entries[idx])
    }

    pub fn remove(&mut self, category: Category, code: &str) -> Result<ConfigEntry, CatalogError> {
        let entries = self.list_mut(category);
        let idx = entries
            .iter()
            .position(|e| e.code == code)
            .ok_or_else(|| CatalogError::NotFound { category, code: code.to_string() })?;
        let removed = entries.remove(idx);
        info!(category = %category, code = %removed.code, "Removed catalog entry");
        Ok(removed)
    }

    /// Every entry valid and codes unique within each category
    pub fn validate(&self) -> Result<(), CatalogError> {
        for category in Category::ALL {
            let entries = self.list(category);
            for (idx, entry) in entries.iter().enumerate() {
                Self::check_entry(category, entry)?;
                if entries[..idx].iter().any(|e| e.code == entry.code) {
                    return Err(CatalogError::DuplicateCode { category, code: entry.code.clone() });
                }
            }
        }
        Ok(())
    }

    /// Parse and validate catalog JSON (missing lists default to empty)
    pub fn from_json(contents: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(contents).context("Failed to parse catalog JSON")?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize catalog to JSON")
    }

    /// Load the catalog or create the default one
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Catalog file not found, creating default catalog at {:?}", path);
            let catalog = Catalog::default();
            catalog.save(path)?;
            return Ok(catalog);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {:?}", path))?;
        let catalog: Catalog = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog JSON from {:?}", path))?;
        if let Err(err) = catalog.validate() {
            // Hand-edited files are still usable for lookups
            warn!(path = %path.display(), error = %err, "Catalog contains invalid entries");
        }

        info!(
            machines = catalog.machines.len(),
            products = catalog.products.len(),
            papers = catalog.papers.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write catalog to {:?}", path))?;
        info!("Saved catalog to {:?}", path);
        Ok(())
    }

    /// Read a catalog export; the result replaces the current catalog
    pub fn import(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog import from {:?}", path))?;
        let catalog = Self::from_json(&contents)
            .with_context(|| format!("Rejected catalog import from {:?}", path))?;
        info!(path = %path.display(), "Imported catalog");
        Ok(catalog)
    }

    pub fn export(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write catalog export to {:?}", path))?;
        info!(path = %path.display(), "Exported catalog");
        Ok(())
    }
}
