//! Checks on the PDF handed in for renaming

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::{ErrorCode, ValidationError};
use crate::constants::file::*;

const FIELD: &str = "file";

/// Metadata of the file to rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

impl FileInfo {
    /// Size from the filesystem, MIME type sniffed from the leading bytes
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{:?} has no file name", path))?;
        let size = path
            .metadata()
            .with_context(|| format!("Failed to read metadata of {:?}", path))?
            .len();

        let mut head = [0u8; 5];
        let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        let read = file
            .read(&mut head)
            .with_context(|| format!("Failed to read {:?}", path))?;
        let mime = if head[..read].starts_with(PDF_MAGIC) {
            PDF_MIME
        } else {
            FALLBACK_MIME
        };

        Ok(Self {
            name,
            size,
            mime: mime.to_string(),
        })
    }

    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }
}

/// Empty, oversized, non-PDF or badly named files are rejected, first failure wins
pub fn validate_file(info: &FileInfo) -> Result<(), ValidationError> {
    if info.size == 0 {
        return Err(ValidationError::new(FIELD, ErrorCode::FileEmpty, "File is empty"));
    }
    if info.size > MAX_FILE_SIZE {
        return Err(ValidationError::new(
            FIELD,
            ErrorCode::FileTooLarge,
            format!("File is larger than {} MiB", MAX_FILE_SIZE / (1024 * 1024)),
        ));
    }

    let pdf_extension = info
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(PDF_EXTENSION));
    if info.mime != PDF_MIME || !pdf_extension {
        return Err(ValidationError::new(
            FIELD,
            ErrorCode::InvalidFileType,
            format!("Only PDF files are accepted (got {}, '{}')", info.mime, info.name),
        ));
    }

    validate_file_name(&info.name)
}

/// Character and length rules for names written into the hotfolder
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if let Some(bad) = name
        .chars()
        .find(|c| c.is_control() || FORBIDDEN_FILENAME_CHARS.contains(c))
    {
        return Err(ValidationError::new(
            FIELD,
            ErrorCode::InvalidFilename,
            format!("File name contains invalid character {bad:?}"),
        ));
    }
    if name.trim().is_empty() || name.ends_with('.') || name.ends_with(' ') {
        return Err(ValidationError::new(
            FIELD,
            ErrorCode::InvalidFilename,
            "File name must not be blank or end with '.' or a space",
        ));
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(ValidationError::new(
            FIELD,
            ErrorCode::FilenameTooLong,
            format!("File name is longer than {MAX_FILENAME_BYTES} bytes"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn pdf_info(name: &str, size: u64) -> FileInfo {
        FileInfo {
            name: name.to_string(),
            size,
            mime: PDF_MIME.to_string(),
        }
    }

    #[test]
    fn test_accepts_pdf() {
        assert!(validate_file(&pdf_info("flyer.pdf", 1024)).is_ok());
        assert!(validate_file(&pdf_info("FLYER.PDF", 1024)).is_ok());
    }

    #[test]
    fn test_rejects_empty_file() {
        let err = validate_file(&pdf_info("flyer.pdf", 0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileEmpty);
    }

    #[test]
    fn test_rejects_oversized_file() {
        let err = validate_file(&pdf_info("flyer.pdf", MAX_FILE_SIZE + 1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileTooLarge);
    }

    #[test]
    fn test_rejects_non_pdf_mime() {
        let info = FileInfo {
            mime: "image/png".to_string(),
            ..pdf_info("flyer.pdf", 1024)
        };
        assert_eq!(validate_file(&info).unwrap_err().code, ErrorCode::InvalidFileType);
    }

    #[test]
    fn test_rejects_wrong_extension() {
        assert_eq!(
            validate_file(&pdf_info("flyer.png", 1024)).unwrap_err().code,
            ErrorCode::InvalidFileType
        );
        assert_eq!(
            validate_file(&pdf_info("flyer", 1024)).unwrap_err().code,
            ErrorCode::InvalidFileType
        );
    }

    #[test]
    fn test_file_name_rules() {
        assert_eq!(
            validate_file_name("a|b.pdf").unwrap_err().code,
            ErrorCode::InvalidFilename
        );
        assert_eq!(
            validate_file_name("a\u{7}b.pdf").unwrap_err().code,
            ErrorCode::InvalidFilename
        );
        let long = format!("{}.pdf", "x".repeat(MAX_FILENAME_BYTES));
        assert_eq!(validate_file_name(&long).unwrap_err().code, ErrorCode::FilenameTooLong);
        // Product code delimiters are fine
        assert!(validate_file_name("A1-1#K-P#M_u_s_P#10#D-P#job.pdf").is_ok());
    }

    #[test]
    fn test_from_path_sniffs_pdf() {
        let dir = tempfile::tempdir().unwrap();

        let pdf = dir.path().join("job.pdf");
        fs::write(&pdf, b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap();
        let info = FileInfo::from_path(&pdf).unwrap();
        assert_eq!(info.name, "job.pdf");
        assert_eq!(info.mime, PDF_MIME);
        assert!(validate_file(&info).is_ok());

        let fake = dir.path().join("fake.pdf");
        fs::write(&fake, b"PK\x03\x04zip").unwrap();
        let info = FileInfo::from_path(&fake).unwrap();
        assert_eq!(info.mime, FALLBACK_MIME);
        assert_eq!(validate_file(&info).unwrap_err().code, ErrorCode::InvalidFileType);

        let empty = dir.path().join("empty.pdf");
        fs::write(&empty, b"").unwrap();
        let info = FileInfo::from_path(&empty).unwrap();
        assert_eq!(validate_file(&info).unwrap_err().code, ErrorCode::FileEmpty);
    }
}
