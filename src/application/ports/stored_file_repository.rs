use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{StoredFile, StoredFileId, TaskId};

use super::RepositoryError;

#[async_trait]
pub trait StoredFileRepository: Send + Sync {
    async fn create(&self, file: &StoredFile) -> Result<(), RepositoryError>;

    async fn list_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError>;

    /// Removes every record of the task and returns what was removed.
    async fn delete_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError>;

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>, RepositoryError>;

    async fn delete(&self, id: StoredFileId) -> Result<(), RepositoryError>;
}
