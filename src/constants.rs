//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Config directory and file names
pub mod config {
    /// Directory below the platform config dir (e.g. ~/.config)
    pub const APP_DIR: &str = "hotfolder-rename";

    /// Machines / products / papers catalog
    pub const CATALOG_FILENAME: &str = "catalog.json";

    /// Hotfolder and output preferences
    pub const SETTINGS_FILENAME: &str = "settings.json";

    /// Environment variable overriding the config directory
    pub const DIR_ENV: &str = "HOTFOLDER_RENAME_CONFIG_DIR";

    /// Environment variable for the log level
    pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
}

/// Product code layout consumed by the prepress hotfolder
pub mod naming {
    /// Every order number starts with this letter
    pub const ORDER_PREFIX: char = 'A';

    /// Customer names are cut to this many characters
    pub const CUSTOMER_MAX_CHARS: usize = 20;

    /// Paper type tag for coated stock
    pub const TAG_COATED: &str = "g_s";

    /// Paper type tag for uncoated stock
    pub const TAG_UNCOATED: &str = "u_s";

    /// Appended to the first letter of a custom paper class
    pub const TAG_CUSTOM_SUFFIX: &str = "_s";

    /// Prefix of the trailing paper segment
    pub const PAPER_SEGMENT_PREFIX: &str = "D-";

    /// Thousands separators accepted in quantities ('1'200', '1.200', '1 200')
    pub const THOUSANDS_SEPARATORS: &[char] = &['\'', '\u{2019}', '.', ',', ' ', '\u{a0}', '\u{202f}', '_'];

    /// Separators that may also be decimal marks; only stripped between groups of three digits
    pub const DECIMAL_MARKS: &[char] = &['.', ','];
}

/// Uploaded file checks
pub mod file {
    /// Size ceiling (100 MiB)
    pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

    /// Only MIME type accepted
    pub const PDF_MIME: &str = "application/pdf";

    /// Reported for anything that is not a PDF
    pub const FALLBACK_MIME: &str = "application/octet-stream";

    /// Required extension (compared case-insensitively)
    pub const PDF_EXTENSION: &str = "pdf";

    /// Leading bytes of every PDF document
    pub const PDF_MAGIC: &[u8] = b"%PDF-";

    /// Maximum filename length in bytes (most filesystems)
    pub const MAX_FILENAME_BYTES: usize = 255;

    /// Characters rejected in filenames (Windows shares included)
    pub const FORBIDDEN_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
}

/// Field rule bounds
pub mod validation {
    pub const ORDER_MAX_LENGTH: usize = 20;
    pub const CUSTOMER_MAX_LENGTH: usize = 100;
    pub const POSITION_MIN: i64 = 0;
    pub const POSITION_MAX: i64 = 999;
    pub const CODE_MAX_LENGTH: usize = 30;
    pub const QUANTITY_MIN: i64 = 1;
    pub const QUANTITY_MAX: i64 = 10_000_000;
    pub const PAPER_CLASS_MAX_LENGTH: usize = 30;
    pub const ENTRY_NAME_MAX_LENGTH: usize = 60;
}
