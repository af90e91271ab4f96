use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use crate::application::ports::{ChannelRepository, RepositoryError};
use crate::domain::{Channel, ChannelId, ChannelStatus, EngineType};

const CHANNEL_COLUMNS: &str = "id, name, engine_type, credential, base_url, region, \
     max_file_size, max_duration, supported_formats, supported_languages, weight, status, \
     channel_group, tested_at";

pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a channel; the admin collaborator owns every other write.
    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    pub async fn insert(&self, channel: &Channel) -> Result<(), RepositoryError> {
        sqlx::query(&format!(
            "INSERT INTO channels ({CHANNEL_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(channel.id.as_uuid())
        .bind(&channel.name)
        .bind(channel.engine_type.code())
        .bind(&channel.credential)
        .bind(channel.base_url.as_deref())
        .bind(channel.region.as_deref())
        .bind(channel.max_file_size.map(|v| v as i64))
        .bind(channel.max_duration.map(|v| v as i32))
        .bind(Channel::join_list(&channel.supported_formats))
        .bind(Channel::join_list(&channel.supported_languages))
        .bind(channel.weight)
        .bind(channel.status.code())
        .bind(&channel.group)
        .bind(channel.tested_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn channel_from_row(row: &PgRow) -> Result<Channel, RepositoryError> {
    let engine_code: i32 = row.try_get("engine_type")?;
    let status_code: i32 = row.try_get("status")?;
    Ok(Channel {
        id: ChannelId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        engine_type: EngineType::from_code(engine_code).ok_or_else(|| {
            RepositoryError::CorruptRow(format!("engine_type: unknown code {engine_code}"))
        })?,
        credential: row.try_get("credential")?,
        base_url: row.try_get("base_url")?,
        region: row.try_get("region")?,
        max_file_size: row
            .try_get::<Option<i64>, _>("max_file_size")?
            .map(|v| v as u64),
        max_duration: row
            .try_get::<Option<i32>, _>("max_duration")?
            .map(|v| v as u32),
        supported_formats: Channel::parse_list(&row.try_get::<String, _>("supported_formats")?),
        supported_languages: Channel::parse_list(
            &row.try_get::<String, _>("supported_languages")?,
        ),
        weight: row.try_get("weight")?,
        status: ChannelStatus::from_code(status_code).ok_or_else(|| {
            RepositoryError::CorruptRow(format!("status: unknown code {status_code}"))
        })?,
        group: row.try_get("channel_group")?,
        tested_at: row.try_get("tested_at")?,
    })
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Channel>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(channel_from_row).collect()
    }

    #[instrument(skip(self), fields(channel_id = %id))]
    async fn get_by_id(&self, id: ChannelId) -> Result<Option<Channel>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {CHANNEL_COLUMNS} FROM channels WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(channel_from_row).transpose()
    }

    #[instrument(skip(self, channel), fields(channel_id = %channel.id))]
    async fn update(&self, channel: &Channel) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE channels SET
                name = $2, engine_type = $3, credential = $4, base_url = $5, region = $6,
                max_file_size = $7, max_duration = $8, supported_formats = $9,
                supported_languages = $10, weight = $11, status = $12, channel_group = $13,
                tested_at = $14
            WHERE id = $1
            "#,
        )
        .bind(channel.id.as_uuid())
        .bind(&channel.name)
        .bind(channel.engine_type.code())
        .bind(&channel.credential)
        .bind(channel.base_url.as_deref())
        .bind(channel.region.as_deref())
        .bind(channel.max_file_size.map(|v| v as i64))
        .bind(channel.max_duration.map(|v| v as i32))
        .bind(Channel::join_list(&channel.supported_formats))
        .bind(Channel::join_list(&channel.supported_languages))
        .bind(channel.weight)
        .bind(channel.status.code())
        .bind(&channel.group)
        .bind(channel.tested_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("channel {}", channel.id)));
        }
        Ok(())
    }

    #[instrument(skip(self, ids), fields(count = ids.len(), status = status.as_str()))]
    async fn update_status(
        &self,
        ids: &[ChannelId],
        status: ChannelStatus,
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let result = sqlx::query("UPDATE channels SET status = $1 WHERE id = ANY($2)")
            .bind(status.code())
            .bind(&ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
