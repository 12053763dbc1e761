#![forbid(unsafe_code)]

mod cli;
mod config;
mod constants;
mod form;
mod generator;
mod hotfolder;
mod validation;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command, ConfigCommand, FormArgs, HotfolderCommand, RenameArgs, ValidateArgs};
use config::{Catalog, Category, ConfigEntry, ConfigPaths, EntryUpdate, Settings};
use form::FormData;
use hotfolder::{check_hotfolder, save_renamed, target_file_name, Destination, HotfolderError};
use validation::{
    validate_field_by_name, validate_file, validate_file_name, validate_form, Field, FileInfo,
    ValidationError,
};

fn parse_level(level: &str) -> TraceLevel {
    match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    }
}

/// LOG_LEVEL wins over the level stored in settings
fn init_logging(paths: &ConfigPaths) -> Result<()> {
    let level = std::env::var(constants::config::LOG_LEVEL_ENV)
        .ok()
        .or_else(|| Settings::peek(&paths.settings()).map(|s| s.log_level))
        .unwrap_or_else(|| "info".to_string());

    // Logs go to stderr, command output to stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&level))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_errors(errors: &[ValidationError]) {
    for err in errors {
        println!("{:<18} {:<18} {}", err.field, err.code, err.message);
    }
}

/// Form from `--form` (if given) overlaid with the flags; catalog names become
/// codes and the paper class defaults to the paper's type
fn load_form(args: &FormArgs, catalog: &Catalog) -> Result<FormData> {
    let base = match &args.form {
        Some(path) => FormData::load(path)?,
        None => FormData::default(),
    };
    let mut form = args.apply(base);
    form.fill_from_catalog(catalog);
    form.resolve_codes(catalog);
    Ok(form)
}

fn cmd_generate(paths: &ConfigPaths, args: &FormArgs) -> Result<bool> {
    let catalog = Catalog::load(&paths.catalog())?;
    let form = load_form(args, &catalog)?;

    let code = generator::generate(&form, &catalog);
    if code.is_empty() {
        warn!(missing = ?form.missing_fields(), "Cannot generate product code yet");
    }
    println!("{code}");
    Ok(true)
}

/// Check one field by its form name; catalog names count as their codes
fn cmd_validate_field(catalog: &Catalog, name: &str, value: &str) -> bool {
    let value = match Field::from_name(name).and_then(|field| field.category()) {
        Some(category) => catalog.resolve_code(category, value),
        None => value.to_string(),
    };
    match validate_field_by_name(name, &value) {
        Ok(normalized) => {
            println!("OK {normalized}");
            true
        }
        Err(err) => {
            print_errors(&[err]);
            false
        }
    }
}

fn cmd_validate(paths: &ConfigPaths, args: &ValidateArgs) -> Result<bool> {
    let catalog = Catalog::load(&paths.catalog())?;
    if let Some([name, value]) = args.field.as_deref() {
        return Ok(cmd_validate_field(&catalog, name, value));
    }
    let form = load_form(&args.form, &catalog)?;

    let result = validate_form(&form);
    if result.is_valid() {
        println!("OK {}", generator::generate(&result.normalized, &catalog));
        Ok(true)
    } else {
        print_errors(&result.errors);
        Ok(false)
    }
}

fn cmd_check_file(path: &Path) -> Result<bool> {
    let info = FileInfo::from_path(path)?;
    match validate_file(&info) {
        Ok(()) => {
            println!("OK {} ({} bytes, {})", info.name, info.size, info.mime);
            Ok(true)
        }
        Err(err) => {
            print_errors(&[err]);
            Ok(false)
        }
    }
}

fn cmd_rename(paths: &ConfigPaths, args: &RenameArgs) -> Result<bool> {
    let settings = Settings::load(&paths.settings())?;
    let catalog = Catalog::load(&paths.catalog())?;
    let form = load_form(&args.form, &catalog)?;

    let validation = validate_form(&form);
    let mut errors = validation.errors.clone();
    let info = FileInfo::from_path(&args.file)?;
    if let Err(err) = validate_file(&info) {
        errors.push(err);
    }
    if !errors.is_empty() {
        print_errors(&errors);
        return Ok(false);
    }

    let code = generator::generate(&validation.normalized, &catalog);
    let file_name = target_file_name(&code, &info.name);

    let destination = if args.hotfolder {
        let dir = settings.hotfolder.clone().ok_or(HotfolderError::NotConfigured)?;
        Destination::Hotfolder(dir)
    } else {
        let dir = args
            .out
            .clone()
            .or_else(|| settings.output_dir.clone())
            .or_else(|| args.file.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Destination::Output(dir)
    };

    if args.dry_run {
        if let Err(err) = validate_file_name(&file_name) {
            print_errors(&[err]);
            return Ok(false);
        }
        println!("{}", destination.dir().join(&file_name).display());
        return Ok(true);
    }

    let target = save_renamed(&args.file, &destination, &file_name, args.overwrite || settings.overwrite)?;
    println!("{}", target.display());
    Ok(true)
}

fn print_entries(category: Category, entries: &[ConfigEntry]) {
    println!("[{category}]");
    if entries.is_empty() {
        println!("  (no entries)");
    }
    for entry in entries {
        match &entry.entry_type {
            Some(entry_type) => println!("  {:<12} {} ({entry_type})", entry.code, entry.name),
            None => println!("  {:<12} {}", entry.code, entry.name),
        }
    }
}

fn cmd_config(paths: &ConfigPaths, command: &ConfigCommand) -> Result<bool> {
    let catalog_path = paths.catalog();

    match command {
        ConfigCommand::List { category } => {
            let catalog = Catalog::load(&catalog_path)?;
            let categories = match category {
                Some(category) => vec![*category],
                None => Category::ALL.to_vec(),
            };
            for category in categories {
                print_entries(category, catalog.list(category));
            }
        }
        ConfigCommand::Add { category, code, name, entry_type } => {
            let mut catalog = Catalog::load(&catalog_path)?;
            catalog.add(*category, ConfigEntry::new(name, code, entry_type.as_deref()))?;
            catalog.save(&catalog_path)?;
            println!("Added {code} to {category}");
        }
        ConfigCommand::Update { category, code, name, new_code, entry_type } => {
            let mut catalog = Catalog::load(&catalog_path)?;
            let update = EntryUpdate {
                name: name.clone(),
                code: new_code.clone(),
                entry_type: entry_type.clone(),
            };
            let updated = catalog.update(*category, code, update)?.code.clone();
            catalog.save(&catalog_path)?;
            println!("Updated {updated} in {category}");
        }
        ConfigCommand::Remove { category, code } => {
            let mut catalog = Catalog::load(&catalog_path)?;
            let removed = catalog.remove(*category, code)?;
            catalog.save(&catalog_path)?;
            println!("Removed {} ({}) from {category}", removed.code, removed.name);
        }
        ConfigCommand::Import { file } => {
            let catalog = Catalog::import(file)?;
            catalog.save(&catalog_path)?;
            println!(
                "Imported {} machines, {} products, {} papers",
                catalog.machines.len(),
                catalog.products.len(),
                catalog.papers.len()
            );
        }
        ConfigCommand::Export { file } => {
            Catalog::load(&catalog_path)?.export(file)?;
            println!("Exported catalog to {}", file.display());
        }
        ConfigCommand::Reset => {
            Catalog::default().save(&catalog_path)?;
            println!("Catalog reset to defaults");
        }
    }
    Ok(true)
}

fn cmd_hotfolder(paths: &ConfigPaths, command: &HotfolderCommand) -> Result<bool> {
    let settings_path = paths.settings();
    let mut settings = Settings::load(&settings_path)?;

    match command {
        HotfolderCommand::Show => match &settings.hotfolder {
            Some(dir) => match check_hotfolder(dir) {
                Ok(()) => println!("{} (ready)", dir.display()),
                Err(err) => {
                    println!("{} ({err})", dir.display());
                    return Ok(false);
                }
            },
            None => println!("No hotfolder configured"),
        },
        HotfolderCommand::Set { dir } => {
            check_hotfolder(dir)?;
            let dir = fs::canonicalize(dir).with_context(|| format!("Failed to resolve {:?}", dir))?;
            info!(hotfolder = %dir.display(), "Hotfolder selected");
            println!("Hotfolder set to {}", dir.display());
            settings.hotfolder = Some(dir);
            settings.save(&settings_path)?;
        }
        HotfolderCommand::Clear => {
            settings.hotfolder = None;
            settings.save(&settings_path)?;
            println!("Hotfolder cleared");
        }
    }
    Ok(true)
}

fn run(cli: &Cli, paths: &ConfigPaths) -> Result<bool> {
    match &cli.command {
        Command::Generate(args) => cmd_generate(paths, args),
        Command::Validate(args) => cmd_validate(paths, args),
        Command::CheckFile { file } => cmd_check_file(file),
        Command::Rename(args) => cmd_rename(paths, args),
        Command::Config(command) => cmd_config(paths, command),
        Command::Hotfolder(command) => cmd_hotfolder(paths, command),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let paths = ConfigPaths::new(cli.config_dir.clone());

    if let Err(err) = init_logging(&paths) {
        eprintln!("failed to initialize logging: {err}");
    }
    debug!(config_dir = %paths.dir().display(), "Using config directory");

    match run(&cli, &paths) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_paths() -> (tempfile::TempDir, ConfigPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::new(Some(dir.path().to_path_buf()));
        (dir, paths)
    }

    fn example_args() -> FormArgs {
        FormArgs {
            order: Some("A12345".to_string()),
            customer: Some("TestKunde".to_string()),
            position: Some("1".to_string()),
            machine: Some("CX75".to_string()),
            quantity: Some("1'200".to_string()),
            product: Some("BRFPP".to_string()),
            paper_class: None,
            paper: Some("NoSat170".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), TraceLevel::DEBUG);
        assert_eq!(parse_level("nonsense"), TraceLevel::INFO);
    }

    #[test]
    fn test_load_form_fills_paper_class_from_catalog() {
        let form = load_form(&example_args(), &Catalog::default()).unwrap();
        assert_eq!(form.papierart, "ungestrichen");
        assert_eq!(
            generator::generate(&form, &Catalog::default()),
            "A12345-1#TestKunde-BRFPP#CX75_u_s_NoSat170#1200#D-NoSat170#"
        );
    }

    #[test]
    fn test_rename_into_hotfolder() {
        let (_config_dir, paths) = test_paths();
        let work = tempfile::tempdir().unwrap();
        let hotfolder = work.path().join("hotfolder");
        fs::create_dir(&hotfolder).unwrap();
        let pdf = work.path().join("job.pdf");
        fs::write(&pdf, b"%PDF-1.7\ncontent").unwrap();

        cmd_hotfolder(&paths, &HotfolderCommand::Set { dir: hotfolder.clone() }).unwrap();

        let args = RenameArgs {
            file: pdf.clone(),
            form: example_args(),
            hotfolder: true,
            out: None,
            overwrite: false,
            dry_run: false,
        };
        assert!(cmd_rename(&paths, &args).unwrap());

        let expected = hotfolder.join("A12345-1#TestKunde-BRFPP#CX75_u_s_NoSat170#1200#D-NoSat170#job.pdf");
        assert!(expected.exists());
    }

    #[test]
    fn test_rename_accepts_catalog_names() {
        let (_config_dir, paths) = test_paths();
        let work = tempfile::tempdir().unwrap();
        let pdf = work.path().join("job.pdf");
        fs::write(&pdf, b"%PDF-1.7\ncontent").unwrap();
        let out = work.path().join("out");

        let form = FormArgs {
            machine: Some("Heidelberg Speedmaster CX 75".to_string()),
            product: Some("Briefpapier".to_string()),
            paper: Some("Normset Satin 170 g/m²".to_string()),
            ..example_args()
        };
        let validate = ValidateArgs {
            form: form.clone(),
            field: None,
        };
        assert!(cmd_validate(&paths, &validate).unwrap());

        let args = RenameArgs {
            file: pdf,
            form,
            hotfolder: false,
            out: Some(out.clone()),
            overwrite: false,
            dry_run: false,
        };
        assert!(cmd_rename(&paths, &args).unwrap());
        assert!(out.join("A12345-1#TestKunde-BRFPP#CX75_u_s_NoSat170#1200#D-NoSat170#job.pdf").exists());
    }

    #[test]
    fn test_validate_single_field() {
        let catalog = Catalog::default();
        assert!(cmd_validate_field(&catalog, "auflage", "1'200"));
        assert!(cmd_validate_field(&catalog, "papiername", "Magno Gloss 135 g/m²"));
        assert!(!cmd_validate_field(&catalog, "kunde", "(-)"));
        assert!(!cmd_validate_field(&catalog, "farbe", "rot"));
    }

    #[test]
    fn test_dry_run_rejects_too_long_target_name() {
        let (_config_dir, paths) = test_paths();
        let work = tempfile::tempdir().unwrap();
        // Legal on its own, too long once the code is prepended
        let name = format!("{}.pdf", "x".repeat(240));
        let pdf = work.path().join(&name);
        fs::write(&pdf, b"%PDF-1.7\ncontent").unwrap();

        let args = RenameArgs {
            file: pdf,
            form: example_args(),
            hotfolder: false,
            out: None,
            overwrite: false,
            dry_run: true,
        };
        assert!(!cmd_rename(&paths, &args).unwrap());
    }

    #[test]
    fn test_rename_without_hotfolder_fails() {
        let (_config_dir, paths) = test_paths();
        let work = tempfile::tempdir().unwrap();
        let pdf = work.path().join("job.pdf");
        fs::write(&pdf, b"%PDF-1.7\ncontent").unwrap();

        let args = RenameArgs {
            file: pdf,
            form: example_args(),
            hotfolder: true,
            out: None,
            overwrite: false,
            dry_run: false,
        };
        let err = cmd_rename(&paths, &args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HotfolderError>(),
            Some(HotfolderError::NotConfigured)
        ));
    }

    #[test]
    fn test_rename_invalid_form_writes_nothing() {
        let (_config_dir, paths) = test_paths();
        let work = tempfile::tempdir().unwrap();
        let pdf = work.path().join("job.pdf");
        fs::write(&pdf, b"%PDF-1.7\ncontent").unwrap();
        let out = work.path().join("out");

        let args = RenameArgs {
            file: pdf,
            form: FormArgs {
                order: Some("X99".to_string()),
                ..example_args()
            },
            hotfolder: false,
            out: Some(out.clone()),
            overwrite: false,
            dry_run: false,
        };
        assert!(!cmd_rename(&paths, &args).unwrap());
        assert!(!out.exists());
    }

    #[test]
    fn test_config_commands_persist() {
        let (_config_dir, paths) = test_paths();

        cmd_config(
            &paths,
            &ConfigCommand::Add {
                category: Category::Machines,
                code: "KOM40".to_string(),
                name: "Komori 40".to_string(),
                entry_type: None,
            },
        )
        .unwrap();
        cmd_config(
            &paths,
            &ConfigCommand::Remove {
                category: Category::Products,
                code: "FLY".to_string(),
            },
        )
        .unwrap();

        let catalog = Catalog::load(&paths.catalog()).unwrap();
        assert!(catalog.find(Category::Machines, "KOM40").is_some());
        assert!(catalog.find(Category::Products, "FLY").is_none());

        let export: PathBuf = paths.dir().join("export.json");
        cmd_config(&paths, &ConfigCommand::Export { file: export.clone() }).unwrap();
        cmd_config(&paths, &ConfigCommand::Reset).unwrap();
        assert_eq!(Catalog::load(&paths.catalog()).unwrap(), Catalog::default());

        cmd_config(&paths, &ConfigCommand::Import { file: export }).unwrap();
        assert_eq!(Catalog::load(&paths.catalog()).unwrap(), catalog);
    }

    #[test]
    fn test_hotfolder_set_rejects_missing_dir() {
        let (config_dir, paths) = test_paths();
        let missing = config_dir.path().join("nope");
        assert!(cmd_hotfolder(&paths, &HotfolderCommand::Set { dir: missing }).is_err());
        assert_eq!(Settings::load(&paths.settings()).unwrap().hotfolder, None);
    }
}
