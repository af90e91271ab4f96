use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, StoredFileRepository};
use crate::domain::{StoragePath, StoredFile, StoredFileId, TaskId, UserId};

const FILE_COLUMNS: &str = "id, user_id, task_id, kind, original_name, stored_name, path, \
     size_bytes, mime_type, storage_backend, expires_at, created_at";

pub struct PgStoredFileRepository {
    pool: PgPool,
}

impl PgStoredFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn file_from_row(row: &PgRow) -> Result<StoredFile, RepositoryError> {
    Ok(StoredFile {
        id: StoredFileId::from_uuid(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        task_id: row
            .try_get::<Option<uuid::Uuid>, _>("task_id")?
            .map(TaskId::from_uuid),
        kind: row
            .try_get::<String, _>("kind")?
            .parse()
            .map_err(|e| RepositoryError::CorruptRow(format!("kind: {e}")))?,
        original_name: row.try_get("original_name")?,
        stored_name: row.try_get("stored_name")?,
        path: StoragePath::from_raw(row.try_get::<String, _>("path")?),
        size_bytes: row.try_get::<i64, _>("size_bytes")? as u64,
        mime_type: row.try_get("mime_type")?,
        storage_backend: row.try_get("storage_backend")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl StoredFileRepository for PgStoredFileRepository {
    #[instrument(skip(self, file), fields(path = %file.path))]
    async fn create(&self, file: &StoredFile) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO stored_files ({FILE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(file.id.as_uuid())
        .bind(file.user_id.as_i64())
        .bind(file.task_id.map(|t| t.as_uuid()))
        .bind(file.kind.as_str())
        .bind(&file.original_name)
        .bind(&file.stored_name)
        .bind(file.path.as_str())
        .bind(file.size_bytes as i64)
        .bind(&file.mime_type)
        .bind(&file.storage_backend)
        .bind(file.expires_at)
        .bind(file.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %task_id))]
    async fn list_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {FILE_COLUMNS} FROM stored_files WHERE task_id = $1 ORDER BY created_at"
        ))
        .bind(task_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(file_from_row).collect()
    }

    #[instrument(skip(self), fields(task_id = %task_id))]
    async fn delete_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "DELETE FROM stored_files WHERE task_id = $1 RETURNING {FILE_COLUMNS}"
        ))
        .bind(task_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(file_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {FILE_COLUMNS} FROM stored_files \
             WHERE expires_at IS NOT NULL AND expires_at < $1 ORDER BY expires_at"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(file_from_row).collect()
    }

    #[instrument(skip(self), fields(file_id = %id.as_uuid()))]
    async fn delete(&self, id: StoredFileId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM stored_files WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
