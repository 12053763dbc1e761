//! Input validation for form fields, catalog entries and uploaded files
//!
//! Failures are plain values carrying a machine-readable [`ErrorCode`] and a
//! message for the operator. Form validation collects every failure instead
//! of stopping at the first one.

pub mod file;
pub mod rules;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use file::{validate_file, validate_file_name, FileInfo};
pub use rules::{
    validate_entry, validate_field, validate_field_by_name, validate_form, Field, FieldResult,
    FormValidation,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Required,
    Pattern,
    MinLength,
    MaxLength,
    NotANumber,
    MinValue,
    MaxValue,
    InvalidOption,
    UnknownField,
    FileEmpty,
    FileTooLarge,
    InvalidFileType,
    InvalidFilename,
    FilenameTooLong,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "REQUIRED",
            ErrorCode::Pattern => "PATTERN",
            ErrorCode::MinLength => "MIN_LENGTH",
            ErrorCode::MaxLength => "MAX_LENGTH",
            ErrorCode::NotANumber => "NOT_A_NUMBER",
            ErrorCode::MinValue => "MIN_VALUE",
            ErrorCode::MaxValue => "MAX_VALUE",
            ErrorCode::InvalidOption => "INVALID_OPTION",
            ErrorCode::UnknownField => "UNKNOWN_FIELD",
            ErrorCode::FileEmpty => "FILE_EMPTY",
            ErrorCode::FileTooLarge => "FILE_TOO_LARGE",
            ErrorCode::InvalidFileType => "INVALID_FILE_TYPE",
            ErrorCode::InvalidFilename => "INVALID_FILENAME",
            ErrorCode::FilenameTooLong => "FILENAME_TOO_LONG",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A rejected input
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message} [{code}]")]
pub struct ValidationError {
    pub field: String,
    pub code: ErrorCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}
