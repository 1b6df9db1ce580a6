use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, Result};
use super::models::{FileUpload, StorageKey, StorageStats, StoredObject};
use super::storage::{DiskStore, MemoryStore, ObjectStore, StoreError};
use super::validation::{FileValidationConfig, FileValidator};

#[derive(Debug, Clone)]
pub struct FileManagerConfig {
    pub storage_path: PathBuf,
    pub backend: StorageBackend,
    pub validation: FileValidationConfig,
}

impl Default for FileManagerConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("uploads"),
            backend: StorageBackend::Disk,
            validation: FileValidationConfig::default(),
        }
    }
}

impl From<&StorageConfig> for FileManagerConfig {
    fn from(config: &StorageConfig) -> Self {
        Self {
            storage_path: config.upload_dir.clone(),
            backend: config.backend,
            validation: FileValidationConfig {
                max_file_size: config.max_file_size_bytes,
                allowed_extensions: config.allowed_extensions.iter().cloned().collect(),
                check_magic_bytes: config.check_magic_bytes,
            },
        }
    }
}

/// The upload pipeline: validation first, storage only for accepted uploads.
#[derive(Clone)]
pub struct FileManager {
    validator: FileValidator,
    store: Arc<dyn ObjectStore>,
}

impl FileManager {
    pub fn new(validator: FileValidator, store: Arc<dyn ObjectStore>) -> Self {
        Self { validator, store }
    }

    pub async fn from_config(config: FileManagerConfig) -> Result<Self> {
        let validator = FileValidator::new(config.validation);

        let store: Arc<dyn ObjectStore> = match config.backend {
            StorageBackend::Disk => {
                let store = DiskStore::open(&config.storage_path).await?;
                tracing::info!("Storing uploads in {}", store.root().display());
                Arc::new(store)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory upload storage, objects are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::new(validator, store))
    }

    pub fn in_memory(validation: FileValidationConfig) -> Self {
        Self::new(FileValidator::new(validation), Arc::new(MemoryStore::new()))
    }

    pub fn validator(&self) -> &FileValidator {
        &self.validator
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub async fn store_file(&self, upload: FileUpload) -> Result<StoredObject> {
        let size = upload.declared_size.max(upload.data.len() as u64);
        let extension = self
            .validator
            .validate_upload(&upload.original_filename, size)?;

        self.validator.validate_content(&extension, &upload.data)?;

        let object = self.store.put(&extension, &upload.data).await?;

        tracing::info!(
            object_id = %object.object_id,
            size = object.size,
            "Stored upload as {}",
            object.key()
        );

        Ok(object)
    }

    /// Resolves a client-supplied key. Malformed keys and extensions outside
    /// the allowlist never reach the backend.
    pub async fn get_file(&self, raw_key: &str) -> Result<(StorageKey, Vec<u8>)> {
        let key = StorageKey::parse(raw_key)
            .filter(|key| self.validator.is_allowed_extension(key.extension()))
            .ok_or_else(|| StoreError::InvalidKey(raw_key.to_string()))?;

        let data = self.store.get(&key).await?;
        Ok((key, data))
    }

    pub async fn get_storage_stats(&self) -> Result<StorageStats> {
        self.store.stats().await.map_err(AppError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::ValidationError;
    use tempfile::TempDir;

    async fn create_test_setup() -> (FileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();

        let config = FileManagerConfig {
            storage_path: temp_dir.path().to_path_buf(),
            backend: StorageBackend::Disk,
            validation: FileValidationConfig {
                max_file_size: 1024,
                ..Default::default()
            },
        };

        let manager = FileManager::from_config(config).await.unwrap();
        (manager, temp_dir)
    }

    fn stored_count(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[tokio::test]
    async fn test_store_and_retrieve_file() {
        let (manager, _temp_dir) = create_test_setup().await;

        let upload = FileUpload::new("holiday.JPG", b"Hello, World!".to_vec());
        let object = manager.store_file(upload).await.unwrap();
        assert_eq!(object.extension, "jpg");
        assert_eq!(object.size, 13);
        assert!(object.url().starts_with("/uploads/"));
        assert!(object.url().ends_with(".jpg"));

        let (key, data) = manager.get_file(&object.key()).await.unwrap();
        assert_eq!(key.object_id(), object.object_id);
        assert_eq!(data, b"Hello, World!");
    }

    #[tokio::test]
    async fn test_rejected_uploads_write_nothing() {
        let (manager, temp_dir) = create_test_setup().await;

        let result = manager
            .store_file(FileUpload::new("malware.exe", b"MZ".to_vec()))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::TypeNotAllowed { .. }))
        ));

        let result = manager
            .store_file(FileUpload::new("big.png", vec![0; 1025]))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::PayloadTooLarge { size: 1025, max_size: 1024 }))
        ));

        let result = manager.store_file(FileUpload::new("", b"x".to_vec())).await;
        assert!(matches!(result, Err(AppError::Validation(ValidationError::NoFileSelected))));

        assert_eq!(stored_count(&temp_dir), 0);
    }

    #[tokio::test]
    async fn test_payload_at_limit_is_stored() {
        let (manager, temp_dir) = create_test_setup().await;

        manager
            .store_file(FileUpload::new("exact.gif", vec![7; 1024]))
            .await
            .unwrap();
        assert_eq!(stored_count(&temp_dir), 1);
    }

    #[tokio::test]
    async fn test_traversal_keys_are_not_found() {
        let (manager, temp_dir) = create_test_setup().await;
        std::fs::write(temp_dir.path().join("secret.png"), b"secret").unwrap();

        for key in ["../secret.png", "secret.png", "/etc/passwd", "..%2Fsecret.png", ""] {
            let result = manager.get_file(key).await;
            assert!(matches!(result, Err(AppError::NotFound(_))), "{key:?}");
        }
    }

    #[tokio::test]
    async fn test_keys_outside_allowlist_are_not_served() {
        let (manager, temp_dir) = create_test_setup().await;
        let key = "6fa459ea-ee8a-4ca4-894e-db77e160355e.exe";
        std::fs::write(temp_dir.path().join(key), b"MZ").unwrap();

        let result = manager.get_file(key).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_content_mismatch_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let config = FileManagerConfig {
            storage_path: temp_dir.path().to_path_buf(),
            backend: StorageBackend::Disk,
            validation: FileValidationConfig {
                check_magic_bytes: true,
                ..Default::default()
            },
        };
        let manager = FileManager::from_config(config).await.unwrap();

        let result = manager
            .store_file(FileUpload::new("photo.png", b"GIF89a....".to_vec()))
            .await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::ContentMismatch { .. }))
        ));
        assert_eq!(stored_count(&temp_dir), 0);

        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        manager
            .store_file(FileUpload::new("photo.png", png.to_vec()))
            .await
            .unwrap();
        assert_eq!(stored_count(&temp_dir), 1);
    }

    #[tokio::test]
    async fn test_storage_stats() {
        let (manager, _temp_dir) = create_test_setup().await;

        manager.store_file(FileUpload::new("a.png", vec![1; 100])).await.unwrap();
        manager.store_file(FileUpload::new("b.png", vec![1; 100])).await.unwrap();

        let stats = manager.get_storage_stats().await.unwrap();
        assert_eq!(stats.object_count, 2);
        assert_eq!(stats.total_bytes, 200);
        assert_eq!(manager.backend_name(), "disk");
    }

    #[tokio::test]
    async fn test_in_memory_manager() {
        let manager = FileManager::in_memory(FileValidationConfig::default());

        let object = manager
            .store_file(FileUpload::new("photo.png", b"pixels".to_vec()))
            .await
            .unwrap();
        let (_, data) = manager.get_file(&object.key()).await.unwrap();
        assert_eq!(data, b"pixels");
        assert_eq!(manager.backend_name(), "memory");
    }
}
