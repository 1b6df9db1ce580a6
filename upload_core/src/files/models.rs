use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Public prefix under which stored objects are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// An upload as it arrives from the transport, before validation.
#[derive(Debug)]
pub struct FileUpload {
    pub original_filename: String,
    pub data: Vec<u8>,
    pub declared_size: u64,
}

impl FileUpload {
    pub fn new(original_filename: impl Into<String>, data: Vec<u8>) -> Self {
        let declared_size = data.len() as u64;
        Self {
            original_filename: original_filename.into(),
            data,
            declared_size,
        }
    }
}

/// Name of a stored object: `<object id>.<extension>`.
///
/// A key can only be produced by [`StorageKey::generate`] or by parsing a
/// string of exactly that shape, so it is always a single, flat path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    object_id: Uuid,
    extension: String,
}

impl StorageKey {
    pub(crate) fn generate(extension: &str) -> Self {
        Self {
            object_id: Uuid::new_v4(),
            extension: extension.to_string(),
        }
    }

    /// Parses a client-supplied key. Returns `None` for anything that is not a
    /// canonical lowercase hyphenated UUID followed by `.` and a lowercase
    /// alphanumeric extension.
    pub fn parse(raw: &str) -> Option<Self> {
        let (id, extension) = raw.split_once('.')?;

        if id.len() != 36 || extension.is_empty() {
            return None;
        }

        if !extension
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        {
            return None;
        }

        let object_id = Uuid::try_parse(id).ok()?;
        if object_id.hyphenated().to_string() != id {
            return None;
        }

        Some(Self {
            object_id,
            extension: extension.to_string(),
        })
    }

    pub fn object_id(&self) -> Uuid {
        self.object_id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.object_id.hyphenated(), self.extension)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredObject {
    pub object_id: Uuid,
    pub extension: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl StoredObject {
    pub(crate) fn new(key: &StorageKey, size: u64) -> Self {
        Self {
            object_id: key.object_id(),
            extension: key.extension().to_string(),
            size,
            created_at: Utc::now(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}.{}", self.object_id.hyphenated(), self.extension)
    }

    /// Client-facing locator, e.g. `/uploads/<uuid>.png`.
    pub fn url(&self) -> String {
        format!("{}{}", UPLOADS_PREFIX, self.key())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageStats {
    pub object_count: u64,
    pub total_bytes: u64,
}
