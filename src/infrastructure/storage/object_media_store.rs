use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{MultipartUpload, ObjectStore, PutPayload};

use crate::application::ports::{MediaStore, MediaStoreError};
use crate::domain::StoragePath;

/// [`MediaStore`] over any `object_store` backend.
pub struct ObjectMediaStore {
    inner: Arc<dyn ObjectStore>,
    backend: &'static str,
}

impl ObjectMediaStore {
    pub fn local(base_path: PathBuf) -> Result<Self, MediaStoreError> {
        std::fs::create_dir_all(&base_path)?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(fs),
            backend: "local",
        })
    }

    pub fn azure(account: &str, access_key: &str, container: &str) -> Result<Self, MediaStoreError> {
        let store = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(access_key)
            .with_container_name(container)
            .build()
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
        Ok(Self {
            inner: Arc::new(store),
            backend: "azure",
        })
    }

    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            backend: "memory",
        }
    }
}

fn not_found_or(e: object_store::Error, other: fn(String) -> MediaStoreError) -> MediaStoreError {
    match e {
        object_store::Error::NotFound { path, .. } => MediaStoreError::NotFound(path),
        e => other(e.to_string()),
    }
}

#[async_trait::async_trait]
impl MediaStore for ObjectMediaStore {
    async fn put_stream(
        &self,
        path: &StoragePath,
        mut stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, MediaStoreError> {
        let store_path = StorePath::from(path.as_str());
        let mut upload = self
            .inner
            .put_multipart(&store_path)
            .await
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;

        let mut total_bytes: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let bytes = match chunk {
                Ok(b) => b,
                Err(e) => {
                    let _ = upload.abort().await;
                    return Err(MediaStoreError::Io(e));
                }
            };
            if bytes.is_empty() {
                continue;
            }
            total_bytes += bytes.len() as u64;
            if let Err(e) = upload.put_part(PutPayload::from(bytes)).await {
                let _ = upload.abort().await;
                return Err(MediaStoreError::WriteFailed(e.to_string()));
            }
        }

        upload
            .complete()
            .await
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;

        tracing::debug!(path = %path, bytes = total_bytes, backend = self.backend, "Blob streamed");
        Ok(total_bytes)
    }

    async fn put(&self, path: &StoragePath, body: Bytes) -> Result<u64, MediaStoreError> {
        let size = body.len() as u64;
        self.inner
            .put(&StorePath::from(path.as_str()), PutPayload::from(body))
            .await
            .map_err(|e| MediaStoreError::WriteFailed(e.to_string()))?;
        Ok(size)
    }

    async fn get(&self, path: &StoragePath) -> Result<Bytes, MediaStoreError> {
        let result = self
            .inner
            .get(&StorePath::from(path.as_str()))
            .await
            .map_err(|e| not_found_or(e, MediaStoreError::ReadFailed))?;
        result
            .bytes()
            .await
            .map_err(|e| MediaStoreError::ReadFailed(e.to_string()))
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError> {
        self.inner
            .delete(&StorePath::from(path.as_str()))
            .await
            .map_err(|e| not_found_or(e, MediaStoreError::DeleteFailed))
    }

    async fn size(&self, path: &StoragePath) -> Result<u64, MediaStoreError> {
        let meta = self
            .inner
            .head(&StorePath::from(path.as_str()))
            .await
            .map_err(|e| not_found_or(e, MediaStoreError::ReadFailed))?;
        Ok(meta.size as u64)
    }

    fn backend_name(&self) -> &'static str {
        self.backend
    }
}
