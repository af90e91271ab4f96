mod adapter_registry;
pub mod capabilities;
mod cancellation_registry;
mod channel_health;
mod engine_selector;
mod file_retention;
mod quota_ledger;
mod task_orchestrator;
mod transcription_worker;

pub use adapter_registry::{AdapterConstructor, AdapterRegistry};
pub use cancellation_registry::CancellationRegistry;
pub use channel_health::{ChannelAdminError, ChannelHealthService, ChannelTestReport};
pub use engine_selector::{EngineSelector, SelectionError, pick_channel};
pub use file_retention::FileRetentionSweeper;
pub use quota_ledger::{
    BYTES_PER_ESTIMATED_SECOND, DEFAULT_RATE_PER_MINUTE, MIN_ESTIMATED_SECONDS, QuotaLedger,
};
pub use task_orchestrator::{
    CreateTaskRequest, OrchestratorSettings, PreviewKind, ResultDownload, ResultPreview,
    TaskError, TaskOrchestrator, TranscriptionJob,
};
pub use transcription_worker::{TranscriptionWorker, WorkerPool, spawn_worker_pool};
