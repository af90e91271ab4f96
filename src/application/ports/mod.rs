mod channel_repository;
mod media_store;
mod quota_store;
mod repository_error;
mod stored_file_repository;
mod task_notifier;
mod task_repository;
mod transcription_adapter;

pub use channel_repository::ChannelRepository;
pub use media_store::{MediaStore, MediaStoreError};
pub use quota_store::{QuotaError, QuotaStore};
pub use repository_error::RepositoryError;
pub use stored_file_repository::StoredFileRepository;
pub use task_notifier::TaskNotifier;
pub use task_repository::{TaskQuery, TaskRepository, TaskStats};
pub use transcription_adapter::{
    AdapterConfig, AdapterError, DEFAULT_ADAPTER_TIMEOUT, TranscriptionAdapter,
};
