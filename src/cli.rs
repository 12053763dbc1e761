//! Command line interface

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Category;
use crate::constants::config::DIR_ENV;
use crate::form::FormData;

/// Rename print-job PDFs to the prepress naming convention and drop them into the hotfolder
#[derive(Parser, Debug)]
#[command(name = "hotfolder-rename", version)]
pub struct Cli {
    /// Directory holding catalog.json and settings.json
    #[arg(long, global = true, env = DIR_ENV)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the product code for an order
    Generate(FormArgs),
    /// Check every form field and list all problems
    Validate(ValidateArgs),
    /// Check that a file is an acceptable PDF
    CheckFile {
        file: PathBuf,
    },
    /// Copy a PDF under its generated name to the hotfolder or an output directory
    Rename(RenameArgs),
    /// Manage machines, products and papers
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Show or change the hotfolder
    #[command(subcommand)]
    Hotfolder(HotfolderCommand),
}

/// The order form; `--form` loads a JSON record, flags override its fields
#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// JSON file with the form fields
    #[arg(long)]
    pub form: Option<PathBuf>,
    #[arg(long, visible_alias = "auftragsnummer")]
    pub order: Option<String>,
    #[arg(long, visible_alias = "kunde")]
    pub customer: Option<String>,
    #[arg(long, visible_alias = "auftragsposition")]
    pub position: Option<String>,
    #[arg(long, visible_alias = "maschine")]
    pub machine: Option<String>,
    #[arg(long, visible_alias = "auflage")]
    pub quantity: Option<String>,
    #[arg(long, visible_alias = "produkt")]
    pub product: Option<String>,
    /// gestrichen, ungestrichen or a custom class; defaults to the paper's type
    #[arg(long, visible_alias = "papierart")]
    pub paper_class: Option<String>,
    #[arg(long, visible_alias = "papiername")]
    pub paper: Option<String>,
}

impl FormArgs {
    /// Overlay the flags onto `base`
    pub fn apply(&self, mut base: FormData) -> FormData {
        let overrides = [
            (&self.order, &mut base.auftragsnummer),
            (&self.customer, &mut base.kunde),
            (&self.position, &mut base.auftragsposition),
            (&self.machine, &mut base.maschine),
            (&self.quantity, &mut base.auflage),
            (&self.product, &mut base.produkt),
            (&self.paper_class, &mut base.papierart),
            (&self.paper, &mut base.papiername),
        ];
        for (value, field) in overrides {
            if let Some(value) = value {
                *field = value.clone();
            }
        }
        base
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub form: FormArgs,
    /// Check a single field instead of the whole form
    #[arg(long, num_args = 2, value_names = ["NAME", "VALUE"], conflicts_with = "form")]
    pub field: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// PDF to rename
    pub file: PathBuf,
    #[command(flatten)]
    pub form: FormArgs,
    /// Write into the configured hotfolder
    #[arg(long, conflicts_with = "out")]
    pub hotfolder: bool,
    /// Write into this directory (default: settings output_dir, else the PDF's directory)
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Replace an existing file with the same name
    #[arg(long)]
    pub overwrite: bool,
    /// Show the target path without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List entries, optionally of one category
    List {
        #[arg(value_enum)]
        category: Option<Category>,
    },
    /// Add an entry
    Add {
        #[arg(value_enum)]
        category: Category,
        code: String,
        name: String,
        /// Paper class of a paper (gestrichen / ungestrichen)
        #[arg(long = "type")]
        entry_type: Option<String>,
    },
    /// Change an entry's name, code or type
    Update {
        #[arg(value_enum)]
        category: Category,
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "code")]
        new_code: Option<String>,
        /// Empty string clears the type
        #[arg(long = "type")]
        entry_type: Option<String>,
    },
    /// Delete an entry
    Remove {
        #[arg(value_enum)]
        category: Category,
        code: String,
    },
    /// Replace the catalog with an exported JSON file
    Import {
        file: PathBuf,
    },
    /// Write the catalog as JSON
    Export {
        file: PathBuf,
    },
    /// Restore the built-in catalog
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum HotfolderCommand {
    /// Print the configured hotfolder and whether it is usable
    Show,
    /// Remember a hotfolder directory
    Set {
        dir: PathBuf,
    },
    /// Forget the hotfolder
    Clear,
}
