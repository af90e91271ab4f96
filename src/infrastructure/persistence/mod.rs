mod pg_pool;
mod repositories;

pub use repositories::{
    InMemoryChannelRepository, InMemoryQuotaStore, InMemoryStoredFileRepository,
    InMemoryTaskRepository, PgChannelRepository, PgQuotaStore, PgStoredFileRepository,
    PgTaskRepository,
};

pub use pg_pool::{create_pool, run_migrations};
