use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{ChannelRepository, RepositoryError};
use crate::domain::{Channel, ChannelId, ChannelStatus};

/// Channels kept in insertion order, which is the selector's tie-break order.
#[derive(Default)]
pub struct InMemoryChannelRepository {
    channels: RwLock<Vec<Channel>>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channels(channels: Vec<Channel>) -> Self {
        Self {
            channels: RwLock::new(channels),
        }
    }

    pub async fn insert(&self, channel: Channel) {
        self.channels.write().await.push(channel);
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn list(&self) -> Result<Vec<Channel>, RepositoryError> {
        Ok(self.channels.read().await.clone())
    }

    async fn get_by_id(&self, id: ChannelId) -> Result<Option<Channel>, RepositoryError> {
        Ok(self
            .channels
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn update(&self, channel: &Channel) -> Result<(), RepositoryError> {
        let mut channels = self.channels.write().await;
        let stored = channels
            .iter_mut()
            .find(|c| c.id == channel.id)
            .ok_or_else(|| RepositoryError::NotFound(format!("channel {}", channel.id)))?;
        *stored = channel.clone();
        Ok(())
    }

    async fn update_status(
        &self,
        ids: &[ChannelId],
        status: ChannelStatus,
    ) -> Result<u64, RepositoryError> {
        let mut updated = 0;
        for channel in self
            .channels
            .write()
            .await
            .iter_mut()
            .filter(|c| ids.contains(&c.id))
        {
            channel.status = status;
            updated += 1;
        }
        Ok(updated)
    }
}
