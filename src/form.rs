//! Order form record and paper classes

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::config::catalog::{Catalog, Category};
use crate::constants::naming::{TAG_COATED, TAG_CUSTOM_SUFFIX, TAG_UNCOATED};

/// The eight fields the operator fills in for one print job.
/// JSON field names match the prepress form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub auftragsnummer: String,
    #[serde(default)]
    pub kunde: String,
    #[serde(default)]
    pub auftragsposition: String,
    #[serde(default)]
    pub maschine: String,
    #[serde(default)]
    pub auflage: String,
    #[serde(default)]
    pub produkt: String,
    #[serde(default)]
    pub papierart: String,
    #[serde(default)]
    pub papiername: String,
}

impl FormData {
    /// Read a form record from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read form from {:?}", path))?;
        let form = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse form JSON from {:?}", path))?;
        Ok(form)
    }

    /// All fields in form order, paired with their names
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("auftragsnummer", &self.auftragsnummer),
            ("kunde", &self.kunde),
            ("auftragsposition", &self.auftragsposition),
            ("maschine", &self.maschine),
            ("auflage", &self.auflage),
            ("produkt", &self.produkt),
            ("papierart", &self.papierart),
            ("papiername", &self.papiername),
        ]
    }

    /// Names of the fields that are blank after trimming
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }

    /// Picking a paper preselects its class: an empty `papierart` takes the
    /// `type` of the matching paper entry, if it has one.
    pub fn fill_from_catalog(&mut self, catalog: &Catalog) {
        if !self.papierart.trim().is_empty() {
            return;
        }
        let paper_type = catalog
            .find(Category::Papers, &self.papiername)
            .and_then(|entry| entry.entry_type.clone());
        if let Some(paper_type) = paper_type {
            debug!(paper = %self.papiername, paper_type = %paper_type, "Filled paper class from catalog");
            self.papierart = paper_type;
        }
    }

    /// Replace catalog names in machine, product and paper with their codes
    pub fn resolve_codes(&mut self, catalog: &Catalog) {
        let fields = [
            (Category::Machines, &mut self.maschine),
            (Category::Products, &mut self.produkt),
            (Category::Papers, &mut self.papiername),
        ];
        for (category, value) in fields {
            if let Some(entry) = catalog.find(category, value.as_str()) {
                if entry.code != *value {
                    debug!(category = %category, name = %value, code = %entry.code, "Resolved catalog name");
                    *value = entry.code.clone();
                }
            }
        }
    }
}

/// Paper class selected in the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperClass {
    Coated,
    Uncoated,
    Custom(String),
}

impl PaperClass {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.to_lowercase().as_str() {
            "gestrichen" | "coated" => PaperClass::Coated,
            "ungestrichen" | "uncoated" => PaperClass::Uncoated,
            _ => PaperClass::Custom(value.to_string()),
        }
    }

    /// Three-character tag used in the machine segment
    pub fn tag(&self) -> String {
        match self {
            PaperClass::Coated => TAG_COATED.to_string(),
            PaperClass::Uncoated => TAG_UNCOATED.to_string(),
            PaperClass::Custom(name) => {
                let first: String = name.chars().next().into_iter().flat_map(char::to_lowercase).collect();
                format!("{first}{TAG_CUSTOM_SUFFIX}")
            }
        }
    }
}
