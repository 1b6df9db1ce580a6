pub mod manager;
pub mod models;
pub mod storage;
pub mod validation;

pub use manager::{FileManager, FileManagerConfig};
pub use models::{FileUpload, StorageKey, StorageStats, StoredObject, UPLOADS_PREFIX};
pub use storage::{DiskStore, MemoryStore, ObjectStore, StoreError};
pub use validation::{FileValidationConfig, FileValidator, ValidationError};
