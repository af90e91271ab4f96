mod in_memory_channel_repository;
mod in_memory_quota_store;
mod in_memory_stored_file_repository;
mod in_memory_task_repository;
mod pg_channel_repository;
mod pg_quota_store;
mod pg_stored_file_repository;
mod pg_task_repository;

pub use in_memory_channel_repository::InMemoryChannelRepository;
pub use in_memory_quota_store::InMemoryQuotaStore;
pub use in_memory_stored_file_repository::InMemoryStoredFileRepository;
pub use in_memory_task_repository::InMemoryTaskRepository;
pub use pg_channel_repository::PgChannelRepository;
pub use pg_quota_store::PgQuotaStore;
pub use pg_stored_file_repository::PgStoredFileRepository;
pub use pg_task_repository::PgTaskRepository;
