use std::collections::BTreeSet;
use thiserror::Error;

/// Default cap on a single uploaded file: 16 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no file part in request")]
    MissingFilePart,

    #[error("file too large")]
    PayloadTooLarge { size: u64, max_size: u64 },

    #[error("no file selected")]
    NoFileSelected,

    #[error("file type not allowed")]
    MissingExtension,

    #[error("file type not allowed")]
    TypeNotAllowed { extension: String },

    #[error("file content does not match its extension")]
    ContentMismatch { extension: String },
}

impl ValidationError {
    pub fn is_payload_too_large(&self) -> bool {
        matches!(self, ValidationError::PayloadTooLarge { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FileValidationConfig {
    pub max_file_size: u64,
    pub allowed_extensions: BTreeSet<String>,
    pub check_magic_bytes: bool,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            check_magic_bytes: false,
        }
    }
}

/// Gatekeeper run before any storage action.
///
/// Validation only looks at the declared filename and the payload size, so the
/// outcome is a pure function of request metadata and the configured limits.
/// Content sniffing is an opt-in extra, see [`FileValidator::validate_content`].
#[derive(Debug, Clone)]
pub struct FileValidator {
    config: FileValidationConfig,
}

impl FileValidator {
    pub fn new(config: FileValidationConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(FileValidationConfig::default())
    }

    pub fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }

    pub fn is_allowed_extension(&self, extension: &str) -> bool {
        self.config.allowed_extensions.contains(extension)
    }

    /// Checks an upload's metadata. On success returns the normalized
    /// (lowercase) extension the object will be stored under.
    ///
    /// Rules apply in order and the first failure wins: size, then filename
    /// presence, then extension presence, then the allowlist.
    pub fn validate_upload(&self, filename: &str, size: u64) -> Result<String, ValidationError> {
        self.validate_size(size)?;
        self.validate_filename(filename)
    }

    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.config.max_file_size {
            return Err(ValidationError::PayloadTooLarge {
                size,
                max_size: self.config.max_file_size,
            });
        }
        Ok(())
    }

    fn validate_filename(&self, filename: &str) -> Result<String, ValidationError> {
        if filename.is_empty() {
            return Err(ValidationError::NoFileSelected);
        }

        let (_, raw_extension) = filename
            .rsplit_once('.')
            .ok_or(ValidationError::MissingExtension)?;

        let extension = raw_extension.to_lowercase();
        if !self.is_allowed_extension(&extension) {
            return Err(ValidationError::TypeNotAllowed { extension });
        }

        Ok(extension)
    }

    /// Optional hardening: reject payloads whose leading bytes contradict the
    /// accepted extension. A no-op unless `check_magic_bytes` is enabled.
    pub fn validate_content(&self, extension: &str, data: &[u8]) -> Result<(), ValidationError> {
        if !self.config.check_magic_bytes {
            return Ok(());
        }

        let magic_matches = match extension {
            "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8, 0xFF]),
            "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            "gif" => data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"),
            _ => true,
        };

        if !magic_matches {
            return Err(ValidationError::ContentMismatch {
                extension: extension.to_string(),
            });
        }

        Ok(())
    }
}
