//! Storage backends for uploaded objects.
//!
//! Objects live in a flat namespace keyed by [`StorageKey`]. The disk backend
//! maps every key to one file directly under its root:
//!
//! ```text
//! {root}/
//! ├── 1b4e28ba-2fa1-11d2-883f-0016d3cca427.png
//! └── 6fa459ea-ee8a-3ca4-894e-db77e160355e.jpg
//! ```

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs as async_fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::models::{StorageKey, StorageStats, StoredObject};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Persists `content` under a freshly generated key. Either the whole
    /// payload becomes visible under the key or nothing does.
    async fn put(&self, extension: &str, content: &[u8]) -> Result<StoredObject, StoreError>;

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StoreError>;

    async fn stats(&self) -> Result<StorageStats, StoreError>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        async_fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.to_string())
    }

    // Leading dot plus suffix: never parses as a StorageKey, so a half
    // written upload cannot be served.
    fn staging_path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(format!(".{}.{}.part", key, Uuid::new_v4().simple()))
    }

    async fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
        let mut file = async_fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn put(&self, extension: &str, content: &[u8]) -> Result<StoredObject, StoreError> {
        let key = StorageKey::generate(extension);
        let staging = self.staging_path(&key);
        let target = self.object_path(&key);

        let committed = match Self::write_synced(&staging, content).await {
            Ok(()) => async_fs::rename(&staging, &target).await,
            Err(e) => Err(e),
        };

        if let Err(e) = committed {
            tracing::error!("Failed to store {}: {}", key, e);
            if let Err(cleanup) = async_fs::remove_file(&staging).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove staging file {}: {}", staging.display(), cleanup);
                }
            }
            return Err(e.into());
        }

        tracing::debug!("Stored {} ({} bytes)", key, content.len());
        Ok(StoredObject::new(&key, content.len() as u64))
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StoreError> {
        match async_fs::read(self.object_path(key)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(key.to_string())),
            Err(e) => {
                tracing::error!("Failed to read {}: {}", key, e);
                Err(e.into())
            }
        }
    }

    async fn stats(&self) -> Result<StorageStats, StoreError> {
        let mut stats = StorageStats::default();
        let mut entries = async_fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let is_object = name.to_str().and_then(StorageKey::parse).is_some();
            if !is_object {
                continue;
            }

            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                stats.object_count += 1;
                stats.total_bytes += metadata.len();
            }
        }

        Ok(stats)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

/// Process-local backend, used when no writable directory is wanted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<StorageKey, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, extension: &str, content: &[u8]) -> Result<StoredObject, StoreError> {
        let key = StorageKey::generate(extension);
        let object = StoredObject::new(&key, content.len() as u64);
        self.objects.write().insert(key, content.to_vec());
        Ok(object)
    }

    async fn get(&self, key: &StorageKey) -> Result<Vec<u8>, StoreError> {
        self.objects
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn stats(&self) -> Result<StorageStats, StoreError> {
        let objects = self.objects.read();
        Ok(StorageStats {
            object_count: objects.len() as u64,
            total_bytes: objects.values().map(|data| data.len() as u64).sum(),
        })
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
