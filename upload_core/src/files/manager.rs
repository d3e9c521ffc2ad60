use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::models::{FileUpload, StoredFile};
use super::sniff::{essence, extension_for};
use super::validation::{FileValidationConfig, FileValidator};
use crate::config::UploadConfig;
use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct FileManagerConfig {
    pub storage_path: PathBuf,
    pub validation: FileValidationConfig,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}

impl From<&UploadConfig> for FileManagerConfig {
    fn from(config: &UploadConfig) -> Self {
        Self {
            storage_path: config.upload_dir.clone(),
            validation: FileValidationConfig::from(config),
        }
    }
}

#[derive(Clone)]
pub struct FileManager {
    config: FileManagerConfig,
    validator: FileValidator,
}

impl FileManager {
    pub fn new(config: FileManagerConfig) -> Self {
        let validator = FileValidator::new(config.validation.clone());

        Self { config, validator }
    }

    pub fn with_default_config() -> Self {
        Self::new(FileManagerConfig::default())
    }

    pub async fn initialize(&self) -> Result<()> {
        if !self.config.storage_path.exists() {
            async_fs::create_dir_all(&self.config.storage_path).await?;
        }

        Ok(())
    }

    pub fn storage_path(&self) -> &Path {
        &self.config.storage_path
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.validator.max_file_size()
    }

    /// Validate, name and write an upload. Names are `<uuid>.<ext>` with the
    /// extension taken from the sniffed type; identical content is stored twice.
    pub async fn store_file(&self, upload: FileUpload) -> Result<StoredFile> {
        let content_type = self.validator.validate_upload(&upload.data)?;

        if let Some(declared) = upload.declared_type.as_deref() {
            if essence(declared) != essence(content_type) {
                tracing::warn!(
                    declared = declared,
                    detected = content_type,
                    "declared file type does not match content"
                );
            }
        }

        let extension = extension_for(content_type).ok_or_else(|| AppError::CantReadFileType {
            content_type: content_type.to_string(),
        })?;

        let filename = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.config.storage_path.join(&filename);

        write_new_file(&path, &upload.data)
            .await
            .map_err(AppError::CantWriteFile)?;

        tracing::info!(
            declared_type = upload.declared_type.as_deref().unwrap_or("-"),
            original_filename = upload.original_filename.as_deref().unwrap_or("-"),
            path = %path.display(),
            "stored upload"
        );

        Ok(StoredFile {
            filename,
            path,
            content_type,
            size: upload.data.len() as u64,
        })
    }
}

async fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = async_fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use tempfile::TempDir;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D];

    async fn create_test_setup() -> (FileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();

        let config = FileManagerConfig {
            storage_path: temp_dir.path().join("uploads"),
            validation: FileValidationConfig::default(),
        };

        let manager = FileManager::new(config);
        manager.initialize().await.unwrap();

        (manager, temp_dir)
    }

    fn upload(data: &'static [u8]) -> FileUpload {
        FileUpload {
            declared_type: Some("image/png".to_string()),
            original_filename: Some("pixel.png".to_string()),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn test_initialize_creates_storage_dir() {
        let (manager, _temp_dir) = create_test_setup().await;
        assert!(manager.storage_path().is_dir());
    }

    #[tokio::test]
    async fn test_store_and_read_back() {
        let (manager, _temp_dir) = create_test_setup().await;

        let stored = manager.store_file(upload(PNG)).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.size, PNG.len() as u64);
        assert!(stored.filename.ends_with(".png"));
        assert!(Uuid::parse_str(stored.filename.trim_end_matches(".png")).is_ok());

        let data = tokio::fs::read(&stored.path).await.unwrap();
        assert_eq!(data, PNG);
    }

    #[tokio::test]
    async fn test_identical_uploads_get_distinct_names() {
        let (manager, _temp_dir) = create_test_setup().await;

        let first = manager.store_file(upload(PNG)).await.unwrap();
        let second = manager.store_file(upload(PNG)).await.unwrap();
        assert_ne!(first.filename, second.filename);

        let count = std::fs::read_dir(manager.storage_path()).unwrap().count();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_extension_follows_content_not_declaration() {
        let (manager, _temp_dir) = create_test_setup().await;

        let mut pdf = upload(b"%PDF-1.5\n%binary");
        pdf.declared_type = Some("image/png".to_string());

        let stored = manager.store_file(pdf).await.unwrap();
        assert!(stored.filename.ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_rejects_disallowed_type() {
        let (manager, _temp_dir) = create_test_setup().await;

        let result = manager.store_file(upload(b"plain text body")).await;
        assert!(matches!(result, Err(AppError::InvalidFileType { .. })));

        let count = std::fs::read_dir(manager.storage_path()).unwrap().count();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_unwritable_storage_dir() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"occupied").unwrap();

        let manager = FileManager::new(FileManagerConfig {
            storage_path: blocker,
            validation: FileValidationConfig::default(),
        });

        let result = manager.store_file(upload(PNG)).await;
        assert!(matches!(result, Err(AppError::CantWriteFile(_))));
    }
}
