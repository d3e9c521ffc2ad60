use std::collections::HashSet;
use thiserror::Error;

use super::sniff::{essence, sniff_content_type};
use crate::config::UploadConfig;
use crate::error::AppError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max_size} bytes)")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("Invalid file type: {content_type}")]
    InvalidFileType { content_type: String },

    #[error("Empty file not allowed")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { max_size, .. } => AppError::FileTooBig { max_bytes: max_size },
            ValidationError::InvalidFileType { content_type } => AppError::InvalidFileType { content_type },
            ValidationError::EmptyFile => AppError::InvalidFile(ValidationError::EmptyFile.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileValidationConfig {
    pub max_file_size: u64,
    /// MIME essences, e.g. `image/png`.
    pub allowed_content_types: HashSet<String>,
}

impl Default for FileValidationConfig {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for FileValidationConfig {
    fn from(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_upload_bytes,
            allowed_content_types: config
                .allowed_content_types
                .iter()
                .map(|ct| essence(ct))
                .collect(),
        }
    }
}

#[derive(Clone)]
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

    /// Checks size and sniffed type; returns the sniffed type on success.
    pub fn validate_upload(&self, data: &[u8]) -> Result<&'static str, ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyFile);
        }

        if data.len() as u64 > self.config.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size: data.len() as u64,
                max_size: self.config.max_file_size,
            });
        }

        let content_type = sniff_content_type(data);
        self.validate_content_type(content_type)?;

        Ok(content_type)
    }

    fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !self.config.allowed_content_types.contains(&essence(content_type)) {
            return Err(ValidationError::InvalidFileType {
                content_type: content_type.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];

    #[test]
    fn test_validate_content_type() {
        let validator = FileValidator::with_default_config();

        assert!(validator.validate_content_type("image/jpeg").is_ok());
        assert!(validator.validate_content_type("image/gif").is_ok());
        assert!(validator.validate_content_type("image/png").is_ok());
        assert!(validator.validate_content_type("application/pdf").is_ok());

        assert!(validator.validate_content_type("text/plain; charset=utf-8").is_err());
        assert!(validator.validate_content_type("application/zip").is_err());
    }

    #[test]
    fn test_validate_upload_returns_sniffed_type() {
        let validator = FileValidator::with_default_config();

        assert_eq!(validator.validate_upload(PNG), Ok("image/png"));
        assert_eq!(validator.validate_upload(b"%PDF-1.4\n"), Ok("application/pdf"));
    }

    #[test]
    fn test_validate_upload_rejections() {
        let validator = FileValidator::new(FileValidationConfig {
            max_file_size: 8,
            ..FileValidationConfig::default()
        });

        assert_eq!(validator.validate_upload(&[]), Err(ValidationError::EmptyFile));
        assert_eq!(
            validator.validate_upload(PNG),
            Err(ValidationError::FileTooLarge { size: 10, max_size: 8 })
        );
        assert!(matches!(
            validator.validate_upload(b"hello"),
            Err(ValidationError::InvalidFileType { .. })
        ));
    }

    #[test]
    fn test_allow_list_from_config_is_normalized() {
        let config = UploadConfig {
            allowed_content_types: vec!["Text/Plain; charset=utf-8".to_string()],
            ..UploadConfig::default()
        };
        let validator = FileValidator::new(FileValidationConfig::from(&config));

        assert!(validator.validate_upload(b"plain words").is_ok());
        assert!(validator.validate_upload(PNG).is_err());
    }

    #[test]
    fn test_validation_error_maps_to_response_code() {
        let err: AppError = ValidationError::EmptyFile.into();
        assert_eq!(err.code(), "INVALID_FILE");

        let err: AppError = ValidationError::FileTooLarge { size: 2, max_size: 1 }.into();
        assert_eq!(err.code(), "FILE_TOO_BIG");

        let err: AppError = ValidationError::InvalidFileType { content_type: "a/b".into() }.into();
        assert_eq!(err.code(), "INVALID_FILE_TYPE");
    }
}
