use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use futures::stream::BoxStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{
    AdapterError, ChannelRepository, MediaStore, MediaStoreError, QuotaError, RepositoryError,
    StoredFileRepository, TaskNotifier, TaskQuery, TaskRepository, TaskStats,
};
use crate::domain::{
    FileKind, MAX_PRIORITY, MIN_PRIORITY, OutputFormat, StoragePath, StoredFile, Task, TaskId,
    TaskStateError, TaskStatus, TranscriptionOptions, TranscriptionResult, UserId, extension_of,
    is_supported_format, is_supported_language, mime_for_format, result_codec,
};

use super::{AdapterRegistry, CancellationRegistry, EngineSelector, QuotaLedger, SelectionError};

/// Handed from `process` to the worker pool.
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    pub task_id: TaskId,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub max_file_size: u64,
    pub max_duration: u32,
    pub retention: chrono::Duration,
    pub poll_interval: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_file_size: super::capabilities::SYSTEM_MAX_FILE_SIZE,
            max_duration: super::capabilities::SYSTEM_MAX_DURATION,
            retention: chrono::Duration::days(30),
            poll_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub user_id: UserId,
    pub token_id: Option<i64>,
    pub filename: String,
    pub file_size: u64,
    pub duration: Option<u32>,
    pub options: TranscriptionOptions,
}

#[derive(Debug, Clone)]
pub struct ResultDownload {
    pub file_name: String,
    pub mime_type: &'static str,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Text,
    Json,
}

impl std::str::FromStr for PreviewKind {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "txt" => Ok(PreviewKind::Text),
            "json" => Ok(PreviewKind::Json),
            other => Err(TaskError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultPreview {
    Text(String),
    Json(Bytes),
}

pub struct TaskOrchestrator {
    tasks: Arc<dyn TaskRepository>,
    files: Arc<dyn StoredFileRepository>,
    channels: Arc<dyn ChannelRepository>,
    media: Arc<dyn MediaStore>,
    notifier: Arc<dyn TaskNotifier>,
    registry: Arc<AdapterRegistry>,
    selector: EngineSelector,
    ledger: Arc<QuotaLedger>,
    cancellations: Arc<CancellationRegistry>,
    queue: mpsc::Sender<TranscriptionJob>,
    settings: OrchestratorSettings,
}

impl TaskOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        files: Arc<dyn StoredFileRepository>,
        channels: Arc<dyn ChannelRepository>,
        media: Arc<dyn MediaStore>,
        notifier: Arc<dyn TaskNotifier>,
        registry: Arc<AdapterRegistry>,
        ledger: Arc<QuotaLedger>,
        queue: mpsc::Sender<TranscriptionJob>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            selector: EngineSelector::new(channels.clone()),
            tasks,
            files,
            channels,
            media,
            notifier,
            registry,
            ledger,
            cancellations: Arc::new(CancellationRegistry::new()),
            queue,
            settings,
        }
    }

    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    pub fn cancellations(&self) -> &CancellationRegistry {
        &self.cancellations
    }

    /// Free slots in the worker queue.
    pub fn queue_headroom(&self) -> usize {
        self.queue.capacity()
    }

    /// False once every worker has dropped its end of the queue.
    pub fn accepting_jobs(&self) -> bool {
        !self.queue.is_closed()
    }

    pub fn storage_backend(&self) -> &'static str {
        self.media.backend_name()
    }

    /// Validates the request, checks the estimate against the balance, picks
    /// a channel and persists the task as `pending`.
    #[tracing::instrument(skip(self, request), fields(user_id = %request.user_id, filename = %request.filename))]
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, TaskError> {
        let file_type = extension_of(&request.filename);
        if !is_supported_format(&file_type) {
            return Err(TaskError::FileNotSupported(request.filename));
        }
        if request.file_size == 0 {
            return Err(TaskError::InvalidRequest("file is empty".to_string()));
        }
        if request.file_size > self.settings.max_file_size {
            return Err(TaskError::FileTooLarge {
                size: request.file_size,
                max: self.settings.max_file_size,
            });
        }
        let options = &request.options;
        if !is_supported_language(&options.language) {
            return Err(TaskError::UnsupportedLanguage(options.language.clone()));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&options.priority) {
            return Err(TaskError::InvalidRequest(format!(
                "priority must be between {MIN_PRIORITY} and {MAX_PRIORITY}"
            )));
        }
        if let Some(duration) = request.duration {
            if duration == 0 || duration > self.settings.max_duration {
                return Err(TaskError::DurationTooLong {
                    duration,
                    max: self.settings.max_duration,
                });
            }
        }

        let estimate =
            self.ledger
                .estimate_cost(request.file_size, request.duration, &options.language);
        self.ledger
            .ensure_affordable(request.user_id, estimate)
            .await?;

        let channel = self.selector.select(&options.language, &file_type).await?;

        let task = Task::new(
            request.user_id,
            request.token_id,
            channel.id,
            request.filename,
            request.file_size,
            file_type,
            request.duration,
            request.options,
            estimate,
        );
        self.tasks.create(&task).await?;

        tracing::info!(
            task_id = %task.id,
            channel_id = %channel.id,
            quota_cost = estimate,
            "Transcription task created"
        );
        Ok(task)
    }

    /// Stores the upload and queues the task. Returns once the task is
    /// queued, long before it is transcribed.
    #[tracing::instrument(skip(self, body), fields(task_id = %task_id))]
    pub async fn process(
        &self,
        task_id: TaskId,
        body: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<Task, TaskError> {
        let mut task = self
            .tasks
            .get_by_id(task_id)
            .await?
            .ok_or(TaskError::NotFound(task_id))?;

        task.transition(TaskStatus::Uploading, 10)?;
        self.persist_active(&task).await?;

        let path = StoragePath::original(&task.id, &task.file_type);
        let written = match self.media.put_stream(&path, body).await {
            Ok(written) => written,
            Err(e) => {
                let message = format!("failed to store upload: {e}");
                self.fail_task(&mut task, "UPLOAD_FAILED", &message).await;
                return Err(TaskError::UploadFailed(message));
            }
        };
        if written != task.file_size {
            if let Err(e) = self.media.delete(&path).await {
                tracing::warn!(error = %e, path = %path, "Failed to remove mismatched upload");
            }
            let message = format!(
                "file size mismatch: declared {}, received {written}",
                task.file_size
            );
            self.fail_task(&mut task, "UPLOAD_FAILED", &message).await;
            return Err(TaskError::UploadFailed(message));
        }

        let original = StoredFile::new(
            task.user_id,
            Some(task.id),
            FileKind::Original,
            task.original_filename.clone(),
            path.clone(),
            written,
            mime_for_format(&task.file_type),
            self.media.backend_name(),
            Some(Utc::now() + self.settings.retention),
        );
        if let Err(e) = self.files.create(&original).await {
            let message = format!("failed to record upload: {e}");
            self.fail_task(&mut task, "UPLOAD_FAILED", &message).await;
            return Err(TaskError::Repository(e));
        }
        task.file_path = Some(path);

        task.transition(TaskStatus::Processing, 20)?;
        self.persist_active(&task).await?;

        let cancel = self.cancellations.register(task.id);
        let job = TranscriptionJob {
            task_id: task.id,
            cancel,
        };
        if let Err(e) = self.queue.try_send(job) {
            self.cancellations.remove(task.id);
            let (code, error) = match e {
                mpsc::error::TrySendError::Full(_) => ("QUEUE_FULL", TaskError::QueueFull),
                mpsc::error::TrySendError::Closed(_) => ("INTERNAL_ERROR", TaskError::QueueClosed),
            };
            self.fail_task(&mut task, code, &error.to_string()).await;
            return Err(error);
        }

        tracing::info!(task_id = %task.id, bytes = written, "Task queued for transcription");
        Ok(task)
    }

    /// Runs one queued task to a terminal state. Called by the worker pool.
    pub async fn execute(&self, job: TranscriptionJob) {
        let span = tracing::info_span!("transcription_task", task_id = %job.task_id);
        async {
            self.execute_job(&job).await;
            self.cancellations.remove(job.task_id);
        }
        .instrument(span)
        .await
    }

    /// Fails a queued task that no worker will pick up, e.g. when the pool
    /// stops with jobs still buffered.
    pub async fn abandon(&self, job: TranscriptionJob) {
        self.cancellations.remove(job.task_id);
        let mut task = match self.tasks.get_by_id(job.task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => return,
            Err(e) => {
                tracing::error!(task_id = %job.task_id, error = %e, "Failed to load abandoned task");
                return;
            }
        };
        if task.is_terminal() {
            return;
        }
        tracing::warn!(task_id = %task.id, "Failing task left in the queue");
        self.fail_task(
            &mut task,
            "INTERNAL_ERROR",
            "service stopped before the task was processed",
        )
        .await;
    }

    async fn execute_job(&self, job: &TranscriptionJob) {
        if job.cancel.is_cancelled() {
            tracing::debug!("Task cancelled before execution");
            return;
        }
        let mut task = match self.tasks.get_by_id(job.task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::warn!("Task vanished before execution");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load task");
                return;
            }
        };
        if task.status != TaskStatus::Processing {
            tracing::debug!(status = %task.status, "Task no longer processing, skipping");
            return;
        }

        match self.run_pipeline(&mut task, &job.cancel).await {
            Ok(Execution::Completed) => {}
            Ok(Execution::Abandoned) => {
                tracing::info!("Task abandoned after cancellation");
                self.refund_quietly(task.id, "cancelled").await;
            }
            Err(failure) => {
                tracing::warn!(code = %failure.code, error = %failure.message, "Transcription failed");
                self.fail_task(&mut task, &failure.code, &failure.message)
                    .await;
            }
        }
    }

    async fn run_pipeline(
        &self,
        task: &mut Task,
        cancel: &CancellationToken,
    ) -> Result<Execution, ExecutionFailure> {
        let channel = self
            .channels
            .get_by_id(task.channel_id)
            .await
            .map_err(|e| ExecutionFailure::new("CONFIG_ERROR", e))?
            .ok_or_else(|| {
                ExecutionFailure::new("CONFIG_ERROR", format!("channel {} not found", task.channel_id))
            })?;
        let adapter = self.registry.for_channel(&channel)?;
        adapter.validate_file(task.file_size, task.duration)?;
        adapter.validate_config(task)?;

        let path = task
            .file_path
            .clone()
            .ok_or_else(|| ExecutionFailure::new("FILE_NOT_FOUND", "task has no stored upload"))?;
        let audio = self
            .media
            .get(&path)
            .await
            .map_err(|e| ExecutionFailure::new("FILE_NOT_FOUND", e))?;

        self.ledger
            .pre_deduct(task.id, task.user_id, task.quota_cost)
            .await
            .map_err(|e| ExecutionFailure::new(e.code(), e))?;

        if cancel.is_cancelled() {
            return Ok(Execution::Abandoned);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Execution::Abandoned),
            submitted = adapter.submit(task, audio) => submitted?,
        }

        while task.status == TaskStatus::Processing {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    if let Err(e) = adapter.cancel(task).await {
                        tracing::debug!(error = %e, "Back-end cancel failed");
                    }
                    return Ok(Execution::Abandoned);
                }
                _ = tokio::time::sleep(self.settings.poll_interval) => {}
            }
            adapter.query_status(task).await?;
            if task.status == TaskStatus::Processing
                && !self
                    .tasks
                    .update_if_active(task)
                    .await
                    .map_err(|e| ExecutionFailure::new("INTERNAL_ERROR", e))?
            {
                return Ok(Execution::Abandoned);
            }
        }

        match task.status {
            TaskStatus::Completed => {}
            TaskStatus::Failed => {
                let code = task
                    .error_code
                    .clone()
                    .unwrap_or_else(|| "TRANSCRIPTION_FAILED".to_string());
                let message = task
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "transcription failed".to_string());
                return Err(ExecutionFailure { code, message });
            }
            _ => return Ok(Execution::Abandoned),
        }

        let result = adapter.get_result(task).await?;
        if cancel.is_cancelled() {
            return Ok(Execution::Abandoned);
        }

        let primary = self.store_renderings(task, &result).await?;

        let billed_seconds = task.billing_duration.or(task.duration);
        let actual = match billed_seconds {
            Some(seconds) => self
                .ledger
                .cost_for_seconds(u64::from(seconds), &task.options.language),
            None => task.quota_cost,
        };
        let billed = self.ledger.settle(task.id, actual).await;
        task.attach_rendering(primary, billed)
            .map_err(|e| ExecutionFailure::new("INTERNAL_ERROR", e))?;

        let written = self
            .tasks
            .update_if_active(task)
            .await
            .map_err(|e| ExecutionFailure::new("INTERNAL_ERROR", e))?;
        if !written {
            return Ok(Execution::Abandoned);
        }
        self.ledger.commit(task.id);

        tracing::info!(
            user_id = %task.user_id,
            quota_cost = task.quota_cost,
            billing_duration = ?task.billing_duration,
            "Transcription completed"
        );
        self.notifier.task_completed(task).await;
        Ok(Execution::Completed)
    }

    /// Writes every rendering and returns the one matching the requested
    /// output format. Partially written renderings are removed on failure.
    async fn store_renderings(
        &self,
        task: &Task,
        result: &TranscriptionResult,
    ) -> Result<StoragePath, ExecutionFailure> {
        let expires_at = Some(Utc::now() + self.settings.retention);
        let mut written: Vec<StoredFile> = Vec::with_capacity(OutputFormat::ALL.len());
        let mut recorded = 0;

        let outcome: Result<(), ExecutionFailure> = async {
            for format in OutputFormat::ALL {
                let content = result_codec::render(result, format)
                    .map_err(|e| ExecutionFailure::new("INTERNAL_ERROR", e))?;
                let path = StoragePath::result(&task.id, format);
                let size = self
                    .media
                    .put(&path, Bytes::from(content))
                    .await
                    .map_err(|e| ExecutionFailure::new("STORAGE_ERROR", e))?;
                written.push(StoredFile::new(
                    task.user_id,
                    Some(task.id),
                    FileKind::Result,
                    path.file_name().to_string(),
                    path,
                    size,
                    format.mime_type(),
                    self.media.backend_name(),
                    expires_at,
                ));
            }
            for file in &written {
                self.files
                    .create(file)
                    .await
                    .map_err(|e| ExecutionFailure::new("STORAGE_ERROR", e))?;
                recorded += 1;
            }
            Ok(())
        }
        .await;

        if let Err(failure) = outcome {
            for (i, file) in written.iter().enumerate() {
                if let Err(e) = self.media.delete(&file.path).await {
                    tracing::warn!(error = %e, path = %file.path, "Failed to remove partial rendering");
                }
                if i < recorded {
                    if let Err(e) = self.files.delete(file.id).await {
                        tracing::warn!(error = %e, path = %file.path, "Failed to remove rendering record");
                    }
                }
            }
            return Err(failure);
        }

        Ok(StoragePath::result(&task.id, task.options.output_format))
    }

    /// Marks the task failed, returns any outstanding charge and notifies.
    async fn fail_task(&self, task: &mut Task, code: &str, message: &str) {
        self.refund_quietly(task.id, "failed").await;
        if !matches!(task.status, TaskStatus::Failed | TaskStatus::Cancelled) {
            if let Err(e) = task.fail_undelivered(code, message) {
                tracing::error!(error = %e, "Failed to mark task failed");
                return;
            }
        }
        task.quota_cost = self.ledger.outstanding(task.id).unwrap_or(0);

        match self.tasks.update_if_active(task).await {
            Ok(true) => self.notifier.task_failed(task).await,
            Ok(false) => tracing::debug!("Task already finished elsewhere, failure not recorded"),
            Err(e) => tracing::error!(error = %e, "Failed to persist task failure"),
        }
    }

    async fn refund_quietly(&self, task_id: TaskId, reason: &str) {
        if let Err(e) = self.ledger.refund(task_id, reason).await {
            tracing::error!(task_id = %task_id, error = %e, "Quota refund failed");
        }
    }

    async fn persist_active(&self, task: &Task) -> Result<(), TaskError> {
        if self.tasks.update_if_active(task).await? {
            return Ok(());
        }
        let current = self
            .tasks
            .get_by_id(task.id)
            .await?
            .ok_or(TaskError::NotFound(task.id))?;
        Err(TaskError::AlreadyFinished(current.status))
    }

    /// Cancels an unfinished task and returns any charge already taken.
    /// A worker running the task stops at its next checkpoint.
    #[tracing::instrument(skip(self), fields(task_id = %task_id, user_id = %user_id))]
    pub async fn cancel(&self, task_id: TaskId, user_id: UserId) -> Result<Task, TaskError> {
        let mut task = self.get(task_id, user_id).await?;
        if task.is_terminal() {
            return Err(TaskError::AlreadyFinished(task.status));
        }
        task.mark_cancelled("cancelled by user")?;
        task.quota_cost = 0;
        self.persist_active(&task).await?;

        self.cancellations.cancel(task_id);
        match self.ledger.refund(task_id, "cancelled by user").await {
            Ok(amount) if amount > 0 => tracing::info!(amount, "Cancelled task refunded"),
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Quota refund failed for cancelled task"),
        }
        if let Some(held) = self.ledger.outstanding(task_id) {
            task.quota_cost = held;
            if let Err(e) = self.tasks.set_quota_cost(task_id, held).await {
                tracing::error!(error = %e, held, "Failed to record unrefunded charge");
            }
        }
        tracing::info!("Task cancelled");
        Ok(task)
    }

    /// Removes the task, its blobs and its file records in any state.
    #[tracing::instrument(skip(self), fields(task_id = %task_id, user_id = %user_id))]
    pub async fn delete(&self, task_id: TaskId, user_id: UserId) -> Result<(), TaskError> {
        let task = self.get(task_id, user_id).await?;
        self.cancellations.cancel(task_id);

        let files = self.files.delete_by_task(task_id).await?;
        for file in &files {
            if let Err(e) = self.media.delete(&file.path).await {
                tracing::warn!(error = %e, path = %file.path, "Failed to delete stored blob");
            }
        }
        if !self.tasks.delete(task_id, user_id).await? {
            return Err(TaskError::NotFound(task_id));
        }
        tracing::info!(status = %task.status, files = files.len(), "Task deleted");
        Ok(())
    }

    pub async fn get(&self, task_id: TaskId, user_id: UserId) -> Result<Task, TaskError> {
        self.tasks
            .get_for_user(task_id, user_id)
            .await?
            .ok_or(TaskError::NotFound(task_id))
    }

    pub async fn list(
        &self,
        user_id: UserId,
        query: &TaskQuery,
    ) -> Result<(Vec<Task>, u64), TaskError> {
        Ok(self.tasks.list_for_user(user_id, query).await?)
    }

    pub async fn stats(&self, user_id: UserId) -> Result<TaskStats, TaskError> {
        Ok(self.tasks.stats_for_user(user_id).await?)
    }

    /// Fetches the stored rendering; defaults to the format requested at
    /// creation.
    pub async fn download(
        &self,
        task_id: TaskId,
        user_id: UserId,
        format: Option<OutputFormat>,
    ) -> Result<ResultDownload, TaskError> {
        let task = self.completed_task(task_id, user_id).await?;
        let format = format.unwrap_or(task.options.output_format);
        let path = StoragePath::result(&task.id, format);
        let body = self.read_rendering(&path).await?;
        Ok(ResultDownload {
            file_name: StoragePath::result_file_name(&task.id, format),
            mime_type: format.mime_type(),
            body,
        })
    }

    pub async fn preview(
        &self,
        task_id: TaskId,
        user_id: UserId,
        kind: PreviewKind,
    ) -> Result<ResultPreview, TaskError> {
        let task = self.completed_task(task_id, user_id).await?;
        match kind {
            PreviewKind::Text => Ok(ResultPreview::Text(task.result_text.unwrap_or_default())),
            PreviewKind::Json => {
                let path = StoragePath::result(&task.id, OutputFormat::Json);
                Ok(ResultPreview::Json(self.read_rendering(&path).await?))
            }
        }
    }

    async fn completed_task(&self, task_id: TaskId, user_id: UserId) -> Result<Task, TaskError> {
        let task = self.get(task_id, user_id).await?;
        if task.status != TaskStatus::Completed {
            return Err(TaskError::ResultNotReady(task.status));
        }
        Ok(task)
    }

    async fn read_rendering(&self, path: &StoragePath) -> Result<Bytes, TaskError> {
        self.media.get(path).await.map_err(|e| match e {
            MediaStoreError::NotFound(_) => TaskError::FileNotFound(path.to_string()),
            other => TaskError::Storage(other),
        })
    }
}

enum Execution {
    Completed,
    Abandoned,
}

struct ExecutionFailure {
    code: String,
    message: String,
}

impl ExecutionFailure {
    fn new(code: &str, message: impl fmt::Display) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<AdapterError> for ExecutionFailure {
    fn from(e: AdapterError) -> Self {
        Self::new(e.code(), e)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("file type not supported: {0}")]
    FileNotSupported(String),
    #[error("file too large: {size} bytes exceeds {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
    #[error("duration {duration}s is outside 1..={max}s")]
    DurationTooLong { duration: u32, max: u32 },
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Quota(#[from] QuotaError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("task not found: {0}")]
    NotFound(TaskId),
    #[error("task already finished with status {0}")]
    AlreadyFinished(TaskStatus),
    #[error(transparent)]
    InvalidState(#[from] TaskStateError),
    #[error("result not ready, task is {0}")]
    ResultNotReady(TaskStatus),
    #[error("upload failed: {0}")]
    UploadFailed(String),
    #[error("result file not found: {0}")]
    FileNotFound(String),
    #[error("transcription queue is full")]
    QueueFull,
    #[error("transcription queue is closed")]
    QueueClosed,
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("storage: {0}")]
    Storage(#[from] MediaStoreError),
}

impl TaskError {
    pub fn code(&self) -> &'static str {
        match self {
            TaskError::FileNotSupported(_) => "FILE_NOT_SUPPORTED",
            TaskError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            TaskError::DurationTooLong { .. } => "DURATION_TOO_LONG",
            TaskError::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            TaskError::InvalidFormat(_) => "INVALID_FORMAT",
            TaskError::InvalidRequest(_) => "INVALID_REQUEST",
            TaskError::Quota(e) => e.code(),
            TaskError::Selection(e) => e.code(),
            TaskError::NotFound(_) => "TASK_NOT_FOUND",
            TaskError::AlreadyFinished(_) => "TASK_ALREADY_FINISHED",
            TaskError::InvalidState(TaskStateError::AlreadyFinished(_)) => "TASK_ALREADY_FINISHED",
            TaskError::InvalidState(_) => "INVALID_STATE",
            TaskError::ResultNotReady(_) => "RESULT_NOT_READY",
            TaskError::UploadFailed(_) => "UPLOAD_FAILED",
            TaskError::FileNotFound(_) => "FILE_NOT_FOUND",
            TaskError::QueueFull => "QUEUE_FULL",
            TaskError::QueueClosed | TaskError::Repository(_) => "INTERNAL_ERROR",
            TaskError::Storage(_) => "STORAGE_ERROR",
        }
    }
}
