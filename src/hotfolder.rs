//! Writing renamed PDFs into the hotfolder or an output directory

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::validation::validate_file_name;

#[derive(Debug, Error)]
pub enum HotfolderError {
    #[error("no hotfolder configured (run `hotfolder set <dir>`)")]
    NotConfigured,
    #[error("hotfolder {0:?} does not exist")]
    NotFound(PathBuf),
    #[error("hotfolder {0:?} is not a directory")]
    NotADirectory(PathBuf),
    #[error("hotfolder {path:?} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0:?} already exists (use --overwrite to replace it)")]
    AlreadyExists(PathBuf),
}

/// Where a renamed file goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Plain output directory, created on demand
    Output(PathBuf),
    /// Watched prepress directory, must already exist
    Hotfolder(PathBuf),
}

impl Destination {
    pub fn dir(&self) -> &Path {
        match self {
            Destination::Output(dir) | Destination::Hotfolder(dir) => dir,
        }
    }
}

/// The generated code is the prefix of the original file name
pub fn target_file_name(code: &str, original_name: &str) -> String {
    format!("{code}{original_name}")
}

/// Existence, directory and write checks for a hotfolder
pub fn check_hotfolder(dir: &Path) -> Result<(), HotfolderError> {
    if !dir.exists() {
        return Err(HotfolderError::NotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(HotfolderError::NotADirectory(dir.to_path_buf()));
    }
    // Probe with a throwaway file; it is removed on drop
    tempfile::Builder::new()
        .prefix(".hotfolder-rename-probe")
        .tempfile_in(dir)
        .map_err(|source| HotfolderError::NotWritable {
            path: dir.to_path_buf(),
            source,
        })?;
    debug!(dir = %dir.display(), "Hotfolder is writable");
    Ok(())
}

fn prepare(destination: &Destination) -> Result<()> {
    match destination {
        Destination::Hotfolder(dir) => check_hotfolder(dir)?,
        Destination::Output(dir) => fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?,
    }
    Ok(())
}

/// Copy `source` to `destination` under `file_name`.
/// The copy is staged in a temporary file next to the target and moved into
/// place in one step, so watchers never pick up a half-written PDF.
pub fn save_renamed(
    source: &Path,
    destination: &Destination,
    file_name: &str,
    overwrite: bool,
) -> Result<PathBuf> {
    validate_file_name(file_name)?;
    prepare(destination)?;

    let dir = destination.dir();
    let target = dir.join(file_name);
    if target.exists() && !overwrite {
        return Err(HotfolderError::AlreadyExists(target).into());
    }

    let mut input = File::open(source).with_context(|| format!("Failed to open {:?}", source))?;
    let mut staged = tempfile::Builder::new()
        .prefix(".hotfolder-rename")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
    let bytes = io::copy(&mut input, staged.as_file_mut())
        .with_context(|| format!("Failed to copy {:?} into {:?}", source, dir))?;
    staged
        .as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush temporary file in {:?}", dir))?;

    if overwrite {
        staged
            .persist(&target)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to move renamed file to {:?}", target))?;
    } else {
        // Fails if the target appeared in the meantime
        staged.persist_noclobber(&target).map_err(|e| {
            if e.error.kind() == io::ErrorKind::AlreadyExists {
                anyhow::Error::from(HotfolderError::AlreadyExists(target.clone()))
            } else {
                anyhow::Error::from(e.error).context(format!("Failed to move renamed file to {:?}", target))
            }
        })?;
    }

    info!(path = %target.display(), bytes, "Saved renamed file");
    Ok(target)
}
