use async_trait::async_trait;

use crate::domain::UserId;

/// Balance side of the external account subsystem.
///
/// `decrease` and `increase` are atomic adjustments; implementations must not
/// read the balance and write it back.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn balance(&self, user_id: UserId) -> Result<i64, QuotaError>;

    /// Fails with [`QuotaError::Insufficient`] and leaves the balance untouched
    /// when it is lower than `amount`.
    async fn decrease(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError>;

    async fn increase(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError>;
}

#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    #[error("insufficient quota: required {required}, available {available}")]
    Insufficient { required: i64, available: i64 },
    #[error("unknown user: {0}")]
    UnknownUser(UserId),
    #[error("quota store unavailable: {0}")]
    Unavailable(String),
}

impl QuotaError {
    pub fn code(&self) -> &'static str {
        match self {
            QuotaError::Insufficient { .. } => "INSUFFICIENT_QUOTA",
            QuotaError::UnknownUser(_) => "USER_NOT_FOUND",
            QuotaError::Unavailable(_) => "QUOTA_UNAVAILABLE",
        }
    }
}
