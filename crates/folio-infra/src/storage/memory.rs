use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use folio_core::ports::{ObjectStorage, StorageError, StoredObject};

use super::{join_url, validate_path};

/// In-memory object storage. Objects are lost on process restart.
pub struct InMemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
    uploads: AtomicUsize,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
            uploads: AtomicUsize::new(0),
        }
    }

    /// Number of upload requests received, successful or not.
    pub fn upload_requests(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        validate_path(path)?;

        let mut objects = self.objects.write().await;
        if objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        validate_path(path)?;
        Ok(self.objects.read().await.get(path).cloned())
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_and_download() {
        let storage = InMemoryObjectStorage::new("http://localhost:8080/media");
        let path = storage
            .upload("blog-images/1-abcdef01-chart.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        let object = storage.download(&path).await.unwrap().unwrap();
        assert_eq!(object.bytes, vec![1, 2, 3]);
        assert_eq!(object.content_type, "image/png");
        assert_eq!(
            storage.public_url(&path),
            "http://localhost:8080/media/blog-images/1-abcdef01-chart.png"
        );
    }

    #[tokio::test]
    async fn test_upload_never_overwrites() {
        let storage = InMemoryObjectStorage::new("http://cdn");
        storage.upload("a/x.png", vec![1], "image/png").await.unwrap();
        let err = storage
            .upload("a/x.png", vec![2], "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
        assert_eq!(storage.upload_requests(), 2);
    }
}
