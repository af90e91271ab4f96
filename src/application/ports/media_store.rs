use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

use crate::domain::StoragePath;

/// Blob storage for uploaded media and rendered results.
#[async_trait::async_trait]
pub trait MediaStore: Send + Sync {
    /// Streams the body into `path` and returns the number of bytes written.
    async fn put_stream(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, MediaStoreError>;

    async fn put(&self, path: &StoragePath, body: Bytes) -> Result<u64, MediaStoreError>;

    async fn get(&self, path: &StoragePath) -> Result<Bytes, MediaStoreError>;

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError>;

    async fn size(&self, path: &StoragePath) -> Result<u64, MediaStoreError>;

    /// Name recorded on stored-file rows, e.g. `local`.
    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("delete failed: {0}")]
    DeleteFailed(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
