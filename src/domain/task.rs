use chrono::{DateTime, Utc};

use super::{
    BillingType, ChannelId, OutputFormat, Quality, StoragePath, TaskId, TaskStatus,
    TranscriptionResult, UserId,
};

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 4;
pub const DEFAULT_PRIORITY: u8 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionOptions {
    pub language: String,
    pub model_name: Option<String>,
    pub enable_timestamps: bool,
    pub enable_speaker: bool,
    pub output_format: OutputFormat,
    pub quality: Quality,
    pub priority: u8,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            language: super::AUTO_LANGUAGE.to_string(),
            model_name: None,
            enable_timestamps: true,
            enable_speaker: false,
            output_format: OutputFormat::Json,
            quality: Quality::Medium,
            priority: DEFAULT_PRIORITY,
        }
    }
}

/// One user-submitted transcription job.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub user_id: UserId,
    pub token_id: Option<i64>,
    pub channel_id: ChannelId,

    pub original_filename: String,
    pub file_path: Option<StoragePath>,
    pub file_size: u64,
    pub file_type: String,
    pub duration: Option<u32>,

    pub options: TranscriptionOptions,

    pub status: TaskStatus,
    pub progress: u8,
    pub error_code: Option<String>,
    pub error_message: Option<String>,

    pub result_text: Option<String>,
    pub result_file_path: Option<StoragePath>,
    pub confidence_score: Option<f64>,
    pub detected_language: Option<String>,

    pub quota_cost: i64,
    pub billing_duration: Option<u32>,
    pub billing_type: BillingType,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskStateError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
    #[error("task already finished with status {0}")]
    AlreadyFinished(TaskStatus),
    #[error("task is {0}, not completed")]
    NotCompleted(TaskStatus),
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        token_id: Option<i64>,
        channel_id: ChannelId,
        original_filename: String,
        file_size: u64,
        file_type: String,
        duration: Option<u32>,
        options: TranscriptionOptions,
        quota_cost: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            user_id,
            token_id,
            channel_id,
            original_filename,
            file_path: None,
            file_size,
            file_type,
            duration,
            options,
            status: TaskStatus::Pending,
            progress: 0,
            error_code: None,
            error_message: None,
            result_text: None,
            result_file_path: None,
            confidence_score: None,
            detected_language: None,
            quota_cost,
            billing_duration: None,
            billing_type: BillingType::Duration,
            created_at: now,
            started_at: None,
            completed_at: None,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Moves the task along the state machine, keeping progress monotonic and
    /// stamping `started_at` / `completed_at` exactly once.
    pub fn transition(&mut self, next: TaskStatus, progress: u8) -> Result<(), TaskStateError> {
        if self.status.is_terminal() {
            return Err(TaskStateError::AlreadyFinished(self.status));
        }
        if !self.status.can_transition_to(next) {
            return Err(TaskStateError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        let now = Utc::now();
        self.status = next;
        self.advance_progress(progress);

        if next == TaskStatus::Processing && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if matches!(next, TaskStatus::Completed | TaskStatus::Failed) && self.completed_at.is_none()
        {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn advance_progress(&mut self, progress: u8) {
        let progress = progress.min(100);
        if progress > self.progress {
            self.progress = progress;
        }
    }

    pub fn mark_failed(
        &mut self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), TaskStateError> {
        self.transition(TaskStatus::Failed, self.progress)?;
        self.error_code = Some(code.into());
        self.error_message = Some(message.into());
        Ok(())
    }

    /// Fails a task whose completion was only recorded in memory, e.g. when
    /// the back-end finished but the result could not be fetched or stored.
    /// Drops every result field so a failed task never carries a transcript.
    /// Tasks already failed or cancelled keep their first outcome.
    pub fn fail_undelivered(
        &mut self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), TaskStateError> {
        if self.status != TaskStatus::Completed {
            return self.mark_failed(code, message);
        }
        let now = Utc::now();
        self.status = TaskStatus::Failed;
        self.error_code = Some(code.into());
        self.error_message = Some(message.into());
        self.result_text = None;
        self.result_file_path = None;
        self.confidence_score = None;
        self.detected_language = None;
        self.billing_duration = None;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_cancelled(&mut self, message: impl Into<String>) -> Result<(), TaskStateError> {
        self.transition(TaskStatus::Cancelled, self.progress)?;
        self.error_message = Some(message.into());
        Ok(())
    }

    /// Moves the task to `completed` with the recognised text and metadata.
    pub fn record_result(&mut self, result: &TranscriptionResult) -> Result<(), TaskStateError> {
        self.transition(TaskStatus::Completed, 100)?;
        self.result_text = Some(result.text.clone());
        self.confidence_score = Some(result.confidence_score.clamp(0.0, 1.0));
        if !result.language.is_empty() {
            self.detected_language = Some(result.language.clone());
        }
        if self.duration.is_none() {
            self.duration = result.billed_seconds();
        }
        self.billing_duration = result.billed_seconds().or(self.duration);
        Ok(())
    }

    /// Points a completed task at its primary rendering and records what was
    /// actually billed.
    pub fn attach_rendering(
        &mut self,
        result_file_path: StoragePath,
        billed_cost: i64,
    ) -> Result<(), TaskStateError> {
        if self.status != TaskStatus::Completed {
            return Err(TaskStateError::NotCompleted(self.status));
        }
        self.result_file_path = Some(result_file_path);
        self.quota_cost = billed_cost;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn elapsed_since_creation(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
