use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::application::ports::{ChannelRepository, RepositoryError};
use crate::domain::{ChannelId, ChannelStatus};

use super::AdapterRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTestReport {
    pub channel_id: ChannelId,
    pub healthy: bool,
    pub status: ChannelStatus,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

/// Admin-side probing of configured channels.
pub struct ChannelHealthService {
    channels: Arc<dyn ChannelRepository>,
    registry: Arc<AdapterRegistry>,
}

impl ChannelHealthService {
    pub fn new(channels: Arc<dyn ChannelRepository>, registry: Arc<AdapterRegistry>) -> Self {
        Self { channels, registry }
    }

    /// Probes the channel's back-end. A failing enabled channel becomes
    /// `auto_disabled`; a passing `auto_disabled` one is enabled again.
    /// Manually disabled channels keep their status.
    #[tracing::instrument(skip(self), fields(channel_id = %id))]
    pub async fn test_channel(&self, id: ChannelId) -> Result<ChannelTestReport, ChannelAdminError> {
        let mut channel = self
            .channels
            .get_by_id(id)
            .await?
            .ok_or(ChannelAdminError::NotFound(id))?;

        let started = Instant::now();
        let probe = match self.registry.for_channel(&channel) {
            Ok(adapter) => adapter.health_check().await,
            Err(e) => Err(e),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let error = match probe {
            Ok(()) => {
                if channel.status == ChannelStatus::AutoDisabled {
                    channel.status = ChannelStatus::Enabled;
                    tracing::info!("Channel re-enabled after passing health check");
                }
                None
            }
            Err(e) => {
                if channel.status == ChannelStatus::Enabled {
                    channel.status = ChannelStatus::AutoDisabled;
                    tracing::warn!(error = %e, "Channel auto-disabled after failing health check");
                }
                Some(e.to_string())
            }
        };
        channel.tested_at = Some(Utc::now());
        self.channels.update(&channel).await?;

        Ok(ChannelTestReport {
            channel_id: id,
            healthy: error.is_none(),
            status: channel.status,
            error,
            elapsed_ms,
        })
    }

    pub async fn update_status(
        &self,
        ids: &[ChannelId],
        status: ChannelStatus,
    ) -> Result<u64, ChannelAdminError> {
        if ids.is_empty() {
            return Err(ChannelAdminError::InvalidRequest(
                "no channel ids given".to_string(),
            ));
        }
        let updated = self.channels.update_status(ids, status).await?;
        tracing::info!(updated, status = status.as_str(), "Channel status updated");
        Ok(updated)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChannelAdminError {
    #[error("channel not found: {0}")]
    NotFound(ChannelId),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}

impl ChannelAdminError {
    pub fn code(&self) -> &'static str {
        match self {
            ChannelAdminError::NotFound(_) => "CHANNEL_NOT_FOUND",
            ChannelAdminError::InvalidRequest(_) => "INVALID_REQUEST",
            ChannelAdminError::Repository(_) => "INTERNAL_ERROR",
        }
    }
}
