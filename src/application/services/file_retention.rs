use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{MediaStore, MediaStoreError, RepositoryError, StoredFileRepository};

/// Periodically removes blobs and file records past their `expires_at`.
pub struct FileRetentionSweeper {
    files: Arc<dyn StoredFileRepository>,
    media: Arc<dyn MediaStore>,
    interval: Duration,
}

impl FileRetentionSweeper {
    pub fn new(
        files: Arc<dyn StoredFileRepository>,
        media: Arc<dyn MediaStore>,
        interval: Duration,
    ) -> Self {
        Self {
            files,
            media,
            interval,
        }
    }

    /// Returns how many records were removed. A blob that is already gone
    /// does not keep its record alive.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, RepositoryError> {
        let expired = self.files.list_expired(now).await?;
        let mut removed = 0;
        for file in expired {
            match self.media.delete(&file.path).await {
                Ok(()) | Err(MediaStoreError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(error = %e, path = %file.path, "Failed to delete expired blob");
                    continue;
                }
            }
            self.files.delete(file.id).await?;
            removed += 1;
        }
        if removed > 0 {
            tracing::info!(removed, "Expired files swept");
        }
        Ok(removed)
    }

    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep(Utc::now()).await {
                        tracing::error!(error = %e, "Retention sweep failed");
                    }
                }
            }
        }
        tracing::info!("Retention sweeper stopped");
    }
}
