use std::sync::Arc;

use crate::application::ports::{ChannelRepository, RepositoryError};
use crate::domain::Channel;

/// Picks the highest-weight enabled channel that accepts the language and the
/// file format. Equal weights resolve to the first one in iteration order.
pub fn pick_channel<'a>(
    channels: &'a [Channel],
    language: &str,
    file_format: &str,
) -> Option<&'a Channel> {
    let mut best: Option<&Channel> = None;
    for channel in channels.iter().filter(|c| {
        c.is_enabled() && c.supports_language(language) && c.supports_format(file_format)
    }) {
        match best {
            Some(current) if channel.weight <= current.weight => {}
            _ => best = Some(channel),
        }
    }
    best
}

pub struct EngineSelector {
    channels: Arc<dyn ChannelRepository>,
}

impl EngineSelector {
    pub fn new(channels: Arc<dyn ChannelRepository>) -> Self {
        Self { channels }
    }

    #[tracing::instrument(skip(self))]
    pub async fn select(&self, language: &str, file_format: &str) -> Result<Channel, SelectionError> {
        let channels = self.channels.list().await?;
        let picked = pick_channel(&channels, language, file_format).ok_or_else(|| {
            SelectionError::EngineUnavailable {
                language: language.to_string(),
                file_format: file_format.to_string(),
            }
        })?;
        tracing::debug!(channel_id = %picked.id, weight = picked.weight, "Channel selected");
        Ok(picked.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("no engine supports language {language} and format {file_format}")]
    EngineUnavailable { language: String, file_format: String },
    #[error("channel lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}

impl SelectionError {
    pub fn code(&self) -> &'static str {
        match self {
            SelectionError::EngineUnavailable { .. } => "ENGINE_UNAVAILABLE",
            SelectionError::Repository(_) => "INTERNAL_ERROR",
        }
    }
}
