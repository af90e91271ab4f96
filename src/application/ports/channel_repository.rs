use async_trait::async_trait;

use crate::domain::{Channel, ChannelId, ChannelStatus};

use super::RepositoryError;

/// Read side of the administrative channel store, plus the status writes the
/// health check performs.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Every channel in stable insertion order.
    async fn list(&self) -> Result<Vec<Channel>, RepositoryError>;

    async fn get_by_id(&self, id: ChannelId) -> Result<Option<Channel>, RepositoryError>;

    async fn update(&self, channel: &Channel) -> Result<(), RepositoryError>;

    async fn update_status(
        &self,
        ids: &[ChannelId],
        status: ChannelStatus,
    ) -> Result<u64, RepositoryError>;
}
