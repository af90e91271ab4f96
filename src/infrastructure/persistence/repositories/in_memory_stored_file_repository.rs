use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::application::ports::{RepositoryError, StoredFileRepository};
use crate::domain::{StoredFile, StoredFileId, TaskId};

#[derive(Default)]
pub struct InMemoryStoredFileRepository {
    files: RwLock<Vec<StoredFile>>,
}

impl InMemoryStoredFileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoredFileRepository for InMemoryStoredFileRepository {
    async fn create(&self, file: &StoredFile) -> Result<(), RepositoryError> {
        self.files.write().await.push(file.clone());
        Ok(())
    }

    async fn list_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .filter(|f| f.task_id == Some(task_id))
            .cloned()
            .collect())
    }

    async fn delete_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError> {
        let mut files = self.files.write().await;
        let (removed, kept): (Vec<_>, Vec<_>) = files
            .drain(..)
            .partition(|f| f.task_id == Some(task_id));
        *files = kept;
        Ok(removed)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>, RepositoryError> {
        Ok(self
            .files
            .read()
            .await
            .iter()
            .filter(|f| f.is_expired(now))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: StoredFileId) -> Result<(), RepositoryError> {
        self.files.write().await.retain(|f| f.id != id);
        Ok(())
    }
}
