use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::application::ports::{QuotaError, QuotaStore};
use crate::domain::UserId;

/// Balances in `user_quotas`. Both adjustments are single conditional
/// `UPDATE`s.
pub struct PgQuotaStore {
    pool: PgPool,
}

impl PgQuotaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn set_balance(&self, user_id: UserId, quota: i64) -> Result<(), QuotaError> {
        sqlx::query(
            "INSERT INTO user_quotas (user_id, quota) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET quota = EXCLUDED.quota",
        )
        .bind(user_id.as_i64())
        .bind(quota)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(())
    }
}

fn unavailable(e: sqlx::Error) -> QuotaError {
    QuotaError::Unavailable(e.to_string())
}

#[async_trait]
impl QuotaStore for PgQuotaStore {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn balance(&self, user_id: UserId) -> Result<i64, QuotaError> {
        sqlx::query_scalar::<_, i64>("SELECT quota FROM user_quotas WHERE user_id = $1")
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?
            .ok_or(QuotaError::UnknownUser(user_id))
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn decrease(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        let result = sqlx::query(
            "UPDATE user_quotas SET quota = quota - $2 WHERE user_id = $1 AND quota >= $2",
        )
        .bind(user_id.as_i64())
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        if result.rows_affected() == 1 {
            return Ok(());
        }
        let available = self.balance(user_id).await?;
        Err(QuotaError::Insufficient {
            required: amount,
            available,
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn increase(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        let result = sqlx::query("UPDATE user_quotas SET quota = quota + $2 WHERE user_id = $1")
            .bind(user_id.as_i64())
            .bind(amount)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        if result.rows_affected() == 0 {
            return Err(QuotaError::UnknownUser(user_id));
        }
        Ok(())
    }
}
