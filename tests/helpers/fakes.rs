use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use scribeflow::application::ports::{
    AdapterError, MediaStore, MediaStoreError, QuotaError, QuotaStore, RepositoryError,
    StoredFileRepository, TaskNotifier, TranscriptionAdapter,
};
use scribeflow::application::services::capabilities;
use scribeflow::domain::{
    EngineType, FileKind, StoragePath, StoredFile, StoredFileId, Task, TaskId, TaskStatus,
    TranscriptionResult, TranscriptionSegment, UserId,
};
use scribeflow::infrastructure::persistence::{InMemoryQuotaStore, InMemoryStoredFileRepository};
use scribeflow::infrastructure::storage::ObjectMediaStore;

pub fn sample_result() -> TranscriptionResult {
    let mut result = TranscriptionResult::new("Bonjour tout le monde. Merci.");
    result.language = "fr".to_string();
    result.duration = 42.5;
    result.confidence_score = 0.93;
    result.segments = vec![
        TranscriptionSegment {
            id: 0,
            start: 0.0,
            end: 2.5,
            text: "Bonjour tout le monde.".to_string(),
            speaker: None,
            confidence: 0.95,
        },
        TranscriptionSegment {
            id: 1,
            start: 2.5,
            end: 42.5,
            text: "Merci.".to_string(),
            speaker: None,
            confidence: 0.91,
        },
    ];
    result
}

#[derive(Debug, Clone)]
pub enum FakeBehavior {
    /// Resolves the task inside `submit`.
    Complete(TranscriptionResult),
    /// `submit` fails with the given error.
    Fail(AdapterError),
    /// Stays `processing` for `polls` status queries, then completes.
    Poll { polls: usize, result: TranscriptionResult },
    /// Never finishes; `query_status` applies the timeout.
    Stall { timeout: Duration },
    /// `submit` never returns.
    Hang,
    /// Resolves the task inside `submit`, but `get_result` reads the result
    /// back from the task the way the Whisper adapters do.
    Resolve(TranscriptionResult),
}

/// Scripted adapter registered under [`EngineType::Local`].
pub struct FakeAdapter {
    behavior: FakeBehavior,
    submits: AtomicUsize,
    polls: AtomicUsize,
    cancels: AtomicUsize,
    healthy: bool,
}

impl FakeAdapter {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            submits: AtomicUsize::new(0),
            polls: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
            healthy: true,
        }
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn submits(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranscriptionAdapter for FakeAdapter {
    fn engine_type(&self) -> EngineType {
        EngineType::Local
    }

    fn engine_name(&self) -> &str {
        "fake"
    }

    fn supported_formats(&self) -> Vec<String> {
        capabilities::resolve_formats(&[], &[])
    }

    fn supported_languages(&self) -> Vec<String> {
        capabilities::resolve_languages(&[], &[])
    }

    fn supported_output_formats(&self) -> Vec<String> {
        capabilities::output_formats()
    }

    fn max_file_size(&self) -> u64 {
        capabilities::resolve_max_file_size(None, None)
    }

    fn max_duration(&self) -> u32 {
        capabilities::resolve_max_duration(None, None)
    }

    fn validate_file(&self, size_bytes: u64, duration: Option<u32>) -> Result<(), AdapterError> {
        capabilities::check_file(size_bytes, duration, self.max_file_size(), self.max_duration())
    }

    fn validate_config(&self, task: &Task) -> Result<(), AdapterError> {
        capabilities::check_options(
            task,
            &self.supported_languages(),
            &self.supported_output_formats(),
        )
    }

    async fn submit(&self, task: &mut Task, _audio: Bytes) -> Result<(), AdapterError> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            FakeBehavior::Complete(result) | FakeBehavior::Resolve(result) => task
                .record_result(result)
                .map_err(|e| AdapterError::TaskNotFound(e.to_string())),
            FakeBehavior::Fail(error) => Err(error.clone()),
            FakeBehavior::Poll { .. } | FakeBehavior::Stall { .. } => Ok(()),
            FakeBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn query_status(&self, task: &mut Task) -> Result<(), AdapterError> {
        let seen = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.behavior {
            FakeBehavior::Poll { polls, result } if seen >= *polls => task
                .record_result(result)
                .map_err(|e| AdapterError::TaskNotFound(e.to_string())),
            FakeBehavior::Poll { .. } => {
                task.advance_progress(50);
                Ok(())
            }
            FakeBehavior::Stall { timeout } => {
                capabilities::apply_timeout(task, *timeout, Utc::now())
            }
            _ => Ok(()),
        }
    }

    async fn get_result(&self, task: &Task) -> Result<TranscriptionResult, AdapterError> {
        match &self.behavior {
            FakeBehavior::Complete(result) | FakeBehavior::Poll { result, .. } => {
                Ok(result.clone())
            }
            _ => capabilities::result_from_task(task),
        }
    }

    async fn cancel(&self, task: &mut Task) -> Result<(), AdapterError> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        if task.status == TaskStatus::Processing {
            return capabilities::cancel_locally(task);
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        if self.healthy {
            Ok(())
        } else {
            Err(AdapterError::Network("connection refused".to_string()))
        }
    }
}

/// Captures notifier calls for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    completed: Mutex<Vec<TaskId>>,
    failed: Mutex<Vec<(TaskId, Option<String>)>>,
}

impl RecordingNotifier {
    pub fn completed(&self) -> Vec<TaskId> {
        self.completed.lock().unwrap().clone()
    }

    pub fn failed(&self) -> Vec<(TaskId, Option<String>)> {
        self.failed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskNotifier for RecordingNotifier {
    async fn task_completed(&self, task: &Task) {
        self.completed.lock().unwrap().push(task.id);
    }

    async fn task_failed(&self, task: &Task) {
        self.failed
            .lock()
            .unwrap()
            .push((task.id, task.error_code.clone()));
    }
}

/// Where the pipeline's storage should break; `None` never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageFaults {
    /// Result blobs written before every further result `put` fails.
    pub result_puts_before_failure: Option<usize>,
    /// Result records created before every further one fails.
    pub result_records_before_failure: Option<usize>,
    /// Every balance credit fails.
    pub refuse_credits: bool,
}

/// Media store that fails result writes after a budget of successes.
pub struct FlakyMediaStore {
    inner: Arc<ObjectMediaStore>,
    puts_left: Option<AtomicUsize>,
}

impl FlakyMediaStore {
    pub fn new(inner: Arc<ObjectMediaStore>, puts_before_failure: Option<usize>) -> Self {
        Self {
            inner,
            puts_left: puts_before_failure.map(AtomicUsize::new),
        }
    }
}

#[async_trait]
impl MediaStore for FlakyMediaStore {
    async fn put_stream(
        &self,
        path: &StoragePath,
        stream: BoxStream<'_, Result<Bytes, io::Error>>,
    ) -> Result<u64, MediaStoreError> {
        self.inner.put_stream(path, stream).await
    }

    async fn put(&self, path: &StoragePath, body: Bytes) -> Result<u64, MediaStoreError> {
        if let Some(left) = &self.puts_left {
            let granted = left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !granted {
                return Err(MediaStoreError::WriteFailed(format!("{path}: disk full")));
            }
        }
        self.inner.put(path, body).await
    }

    async fn get(&self, path: &StoragePath) -> Result<Bytes, MediaStoreError> {
        self.inner.get(path).await
    }

    async fn delete(&self, path: &StoragePath) -> Result<(), MediaStoreError> {
        self.inner.delete(path).await
    }

    async fn size(&self, path: &StoragePath) -> Result<u64, MediaStoreError> {
        self.inner.size(path).await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }
}

/// File records that stop accepting results after a budget of successes.
pub struct FlakyFileRepository {
    inner: Arc<InMemoryStoredFileRepository>,
    results_left: Option<AtomicUsize>,
}

impl FlakyFileRepository {
    pub fn new(
        inner: Arc<InMemoryStoredFileRepository>,
        results_before_failure: Option<usize>,
    ) -> Self {
        Self {
            inner,
            results_left: results_before_failure.map(AtomicUsize::new),
        }
    }
}

#[async_trait]
impl StoredFileRepository for FlakyFileRepository {
    async fn create(&self, file: &StoredFile) -> Result<(), RepositoryError> {
        if let (FileKind::Result, Some(left)) = (file.kind, &self.results_left) {
            let granted = left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if !granted {
                return Err(RepositoryError::ConnectionFailed("pool timed out".to_string()));
            }
        }
        self.inner.create(file).await
    }

    async fn list_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError> {
        self.inner.list_by_task(task_id).await
    }

    async fn delete_by_task(&self, task_id: TaskId) -> Result<Vec<StoredFile>, RepositoryError> {
        self.inner.delete_by_task(task_id).await
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<StoredFile>, RepositoryError> {
        self.inner.list_expired(now).await
    }

    async fn delete(&self, id: StoredFileId) -> Result<(), RepositoryError> {
        self.inner.delete(id).await
    }
}

/// Debits pass through; credits fail when `refuse_credits` is set.
pub struct GuardedQuotaStore {
    inner: Arc<InMemoryQuotaStore>,
    refuse_credits: bool,
}

impl GuardedQuotaStore {
    pub fn new(inner: Arc<InMemoryQuotaStore>, refuse_credits: bool) -> Self {
        Self {
            inner,
            refuse_credits,
        }
    }
}

#[async_trait]
impl QuotaStore for GuardedQuotaStore {
    async fn balance(&self, user_id: UserId) -> Result<i64, QuotaError> {
        self.inner.balance(user_id).await
    }

    async fn decrease(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        self.inner.decrease(user_id, amount).await
    }

    async fn increase(&self, user_id: UserId, amount: i64) -> Result<(), QuotaError> {
        if self.refuse_credits {
            return Err(QuotaError::Unavailable("account service down".to_string()));
        }
        self.inner.increase(user_id, amount).await
    }
}
