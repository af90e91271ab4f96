use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{RepositoryError, TaskQuery, TaskRepository, TaskStats};
use crate::domain::{
    ChannelId, StoragePath, Task, TaskId, TaskStatus, TranscriptionOptions, UserId,
};

const TASK_COLUMNS: &str = r#"
    id, user_id, token_id, channel_id, original_filename, file_path, file_size, file_type,
    duration, language, model_name, enable_timestamps, enable_speaker, output_format, quality,
    priority, status, progress, error_code, error_message, result_text, result_file_path,
    confidence_score, detected_language, quota_cost, billing_duration, billing_type,
    created_at, started_at, completed_at, updated_at
"#;

pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn corrupt(field: &str) -> impl FnOnce(String) -> RepositoryError + '_ {
    move |e| RepositoryError::CorruptRow(format!("{field}: {e}"))
}

fn task_from_row(row: &PgRow) -> Result<Task, RepositoryError> {
    let options = TranscriptionOptions {
        language: row.try_get("language")?,
        model_name: row.try_get("model_name")?,
        enable_timestamps: row.try_get("enable_timestamps")?,
        enable_speaker: row.try_get("enable_speaker")?,
        output_format: row
            .try_get::<String, _>("output_format")?
            .parse()
            .map_err(corrupt("output_format"))?,
        quality: row
            .try_get::<String, _>("quality")?
            .parse()
            .map_err(corrupt("quality"))?,
        priority: row.try_get::<i16, _>("priority")? as u8,
    };

    Ok(Task {
        id: TaskId::from_uuid(row.try_get("id")?),
        user_id: UserId::new(row.try_get("user_id")?),
        token_id: row.try_get("token_id")?,
        channel_id: ChannelId::from_uuid(row.try_get("channel_id")?),
        original_filename: row.try_get("original_filename")?,
        file_path: row
            .try_get::<Option<String>, _>("file_path")?
            .map(StoragePath::from_raw),
        file_size: row.try_get::<i64, _>("file_size")? as u64,
        file_type: row.try_get("file_type")?,
        duration: row.try_get::<Option<i32>, _>("duration")?.map(|d| d as u32),
        options,
        status: row
            .try_get::<String, _>("status")?
            .parse()
            .map_err(corrupt("status"))?,
        progress: row.try_get::<i16, _>("progress")? as u8,
        error_code: row.try_get("error_code")?,
        error_message: row.try_get("error_message")?,
        result_text: row.try_get("result_text")?,
        result_file_path: row
            .try_get::<Option<String>, _>("result_file_path")?
            .map(StoragePath::from_raw),
        confidence_score: row.try_get("confidence_score")?,
        detected_language: row.try_get("detected_language")?,
        quota_cost: row.try_get("quota_cost")?,
        billing_duration: row
            .try_get::<Option<i32>, _>("billing_duration")?
            .map(|d| d as u32),
        billing_type: row
            .try_get::<String, _>("billing_type")?
            .parse()
            .map_err(corrupt("billing_type"))?,
        created_at: row.try_get("created_at")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn create(&self, task: &Task) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO transcription_tasks ({TASK_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31)
            "#
        ))
        .bind(task.id.as_uuid())
        .bind(task.user_id.as_i64())
        .bind(task.token_id)
        .bind(task.channel_id.as_uuid())
        .bind(&task.original_filename)
        .bind(task.file_path.as_ref().map(|p| p.as_str()))
        .bind(task.file_size as i64)
        .bind(&task.file_type)
        .bind(task.duration.map(|d| d as i32))
        .bind(&task.options.language)
        .bind(task.options.model_name.as_deref())
        .bind(task.options.enable_timestamps)
        .bind(task.options.enable_speaker)
        .bind(task.options.output_format.as_str())
        .bind(task.options.quality.as_str())
        .bind(i16::from(task.options.priority))
        .bind(task.status.as_str())
        .bind(i16::from(task.progress))
        .bind(task.error_code.as_deref())
        .bind(task.error_message.as_deref())
        .bind(task.result_text.as_deref())
        .bind(task.result_file_path.as_ref().map(|p| p.as_str()))
        .bind(task.confidence_score)
        .bind(task.detected_language.as_deref())
        .bind(task.quota_cost)
        .bind(task.billing_duration.map(|d| d as i32))
        .bind(task.billing_type.as_str())
        .bind(task.created_at)
        .bind(task.started_at)
        .bind(task.completed_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn get_by_id(&self, id: TaskId) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM transcription_tasks WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(task_from_row).transpose()
    }

    #[instrument(skip(self), fields(task_id = %id, user_id = %user_id))]
    async fn get_for_user(
        &self,
        id: TaskId,
        user_id: UserId,
    ) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM transcription_tasks WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(task_from_row).transpose()
    }

    #[instrument(skip(self, query), fields(user_id = %user_id, page = query.page))]
    async fn list_for_user(
        &self,
        user_id: UserId,
        query: &TaskQuery,
    ) -> Result<(Vec<Task>, u64), RepositoryError> {
        let status = query.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM transcription_tasks
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(user_id.as_i64())
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {TASK_COLUMNS} FROM transcription_tasks
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(user_id.as_i64())
        .bind(status)
        .bind(i64::from(query.page_size))
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let tasks = rows.iter().map(task_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok((tasks, total as u64))
    }

    #[instrument(skip(self, task), fields(task_id = %task.id, status = %task.status))]
    async fn update_if_active(&self, task: &Task) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE transcription_tasks SET
                file_path = $2, duration = $3, status = $4, progress = $5,
                error_code = $6, error_message = $7, result_text = $8, result_file_path = $9,
                confidence_score = $10, detected_language = $11, quota_cost = $12,
                billing_duration = $13, started_at = $14, completed_at = $15, updated_at = $16
            WHERE id = $1 AND status IN ('pending', 'uploading', 'processing')
            "#,
        )
        .bind(task.id.as_uuid())
        .bind(task.file_path.as_ref().map(|p| p.as_str()))
        .bind(task.duration.map(|d| d as i32))
        .bind(task.status.as_str())
        .bind(i16::from(task.progress))
        .bind(task.error_code.as_deref())
        .bind(task.error_message.as_deref())
        .bind(task.result_text.as_deref())
        .bind(task.result_file_path.as_ref().map(|p| p.as_str()))
        .bind(task.confidence_score)
        .bind(task.detected_language.as_deref())
        .bind(task.quota_cost)
        .bind(task.billing_duration.map(|d| d as i32))
        .bind(task.started_at)
        .bind(task.completed_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn set_quota_cost(&self, id: TaskId, quota_cost: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transcription_tasks SET quota_cost = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(quota_cost)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(task_id = %id, user_id = %user_id))]
    async fn delete(&self, id: TaskId, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM transcription_tasks WHERE id = $1 AND user_id = $2")
            .bind(id.as_uuid())
            .bind(user_id.as_i64())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn stats_for_user(&self, user_id: UserId) -> Result<TaskStats, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_tasks,
                COUNT(*) FILTER (WHERE status = $2) AS completed_tasks,
                COUNT(*) FILTER (WHERE status = $3) AS failed_tasks,
                COUNT(*) FILTER (WHERE status = $4) AS processing_tasks,
                COALESCE(SUM(duration), 0)::BIGINT AS total_duration,
                COALESCE(SUM(file_size), 0)::BIGINT AS total_file_size,
                COALESCE(SUM(quota_cost), 0)::BIGINT AS total_quota_cost
            FROM transcription_tasks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .bind(TaskStatus::Completed.as_str())
        .bind(TaskStatus::Failed.as_str())
        .bind(TaskStatus::Processing.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            total_tasks: row.try_get::<i64, _>("total_tasks")? as u64,
            completed_tasks: row.try_get::<i64, _>("completed_tasks")? as u64,
            failed_tasks: row.try_get::<i64, _>("failed_tasks")? as u64,
            processing_tasks: row.try_get::<i64, _>("processing_tasks")? as u64,
            total_duration: row.try_get::<i64, _>("total_duration")? as u64,
            total_file_size: row.try_get::<i64, _>("total_file_size")? as u64,
            total_quota_cost: row.try_get("total_quota_cost")?,
        })
    }
}
