//! Object storage port for uploaded media.

use async_trait::async_trait;

/// A stored object read back from storage.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Object storage trait - abstraction over blob backends (in-memory, local disk).
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `path` without overwriting. Returns the stored path.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Read an object back.
    async fn download(&self, path: &str) -> Result<Option<StoredObject>, StorageError>;

    /// Durable public URL for a stored path.
    fn public_url(&self, path: &str) -> String;
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}
