use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use folio_core::ports::{ObjectStorage, StorageError, StoredObject};

use super::{content_type_for, join_url, validate_path};

/// Object storage on the local filesystem, one file per object under `root`.
pub struct LocalObjectStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }
}

fn backend(e: std::io::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

/// Write `bytes` through `writer`; on failure the half-written file at `target` is removed.
async fn write_or_discard<W>(mut writer: W, bytes: &[u8], target: &Path) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;

    if written.is_err() {
        drop(writer);
        if let Err(e) = tokio::fs::remove_file(target).await {
            tracing::warn!(path = %target.display(), error = %e, "Partial object left on disk");
        }
    }
    written
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        validate_path(path)?;
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(backend)?;
        }

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
                _ => backend(e),
            })?;
        write_or_discard(file, &bytes, &target)
            .await
            .map_err(backend)?;

        tracing::debug!(path, size = bytes.len(), "Object written");
        Ok(path.to_string())
    }

    async fn download(&self, path: &str) -> Result<Option<StoredObject>, StorageError> {
        validate_path(path)?;
        match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => Ok(Some(StoredObject {
                bytes,
                content_type: content_type_for(path).to_string(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(backend(e)),
        }
    }

    fn public_url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use folio_core::domain::ImageUpload;

    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("folio-media-{}", uuid::Uuid::new_v4()))
    }

    struct DiskFull;

    impl AsyncWrite for DiskFull {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<std::io::Result<usize>> {
            Poll::Ready(Err(std::io::Error::other("no space left on device")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let root = temp_root();
        tokio::fs::create_dir_all(&root).await.unwrap();
        let target = root.join("1700000000000-abcd1234-chart.png");
        tokio::fs::write(&target, b"").await.unwrap();

        let err = write_or_discard(DiskFull, b"png-bytes", &target)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
        assert!(!tokio::fs::try_exists(&target).await.unwrap());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_pasted_image_without_extension_is_served_as_image() {
        let root = temp_root();
        let storage = LocalObjectStorage::new(&root, "http://localhost:8080/media");
        let upload = ImageUpload {
            file_name: "image".into(),
            content_type: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        };

        let path = format!("blog-images/{}", upload.object_name(chrono::Utc::now()));
        storage
            .upload(&path, upload.bytes.clone(), &upload.content_type)
            .await
            .unwrap();
        let object = storage.download(&path).await.unwrap().unwrap();
        assert_eq!(object.content_type, "image/png");

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_round_trip_on_disk() {
        let root = temp_root();
        let storage = LocalObjectStorage::new(&root, "http://localhost:8080/media");

        let path = storage
            .upload("blog-images/42-0badf00d-photo.jpg", vec![9, 9], "image/jpeg")
            .await
            .unwrap();
        let object = storage.download(&path).await.unwrap().unwrap();
        assert_eq!(object.bytes, vec![9, 9]);
        assert_eq!(object.content_type, "image/jpeg");

        assert!(matches!(
            storage
                .upload(&path, vec![1], "image/jpeg")
                .await
                .unwrap_err(),
            StorageError::AlreadyExists(_)
        ));
        assert!(storage.download("blog-images/missing.png").await.unwrap().is_none());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
