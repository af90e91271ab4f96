use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{EngineType, Task, TranscriptionResult};

pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(300);

/// Uniform contract over one-shot and polling recognition back-ends.
///
/// One-shot back-ends resolve the task inside [`submit`](Self::submit) and
/// treat [`query_status`](Self::query_status) as a no-op. Polling back-ends
/// leave the task `processing` after `submit` and advance it from
/// `query_status`, failing it with `TIMEOUT` once the configured timeout has
/// elapsed since creation.
#[async_trait]
pub trait TranscriptionAdapter: Send + Sync {
    fn engine_type(&self) -> EngineType;

    fn engine_name(&self) -> &str;

    fn supported_formats(&self) -> Vec<String>;

    fn supported_languages(&self) -> Vec<String>;

    fn supported_output_formats(&self) -> Vec<String>;

    fn max_file_size(&self) -> u64;

    fn max_duration(&self) -> u32;

    /// Must pass before any network call is made.
    fn validate_file(&self, size_bytes: u64, duration: Option<u32>) -> Result<(), AdapterError>;

    fn validate_config(&self, task: &Task) -> Result<(), AdapterError>;

    async fn submit(&self, task: &mut Task, audio: Bytes) -> Result<(), AdapterError>;

    async fn query_status(&self, task: &mut Task) -> Result<(), AdapterError>;

    async fn get_result(&self, task: &Task) -> Result<TranscriptionResult, AdapterError>;

    /// Best effort: a one-shot back-end cannot stop work already in flight,
    /// so this only marks the local task as cancelled.
    async fn cancel(&self, task: &mut Task) -> Result<(), AdapterError>;

    async fn health_check(&self) -> Result<(), AdapterError>;
}

/// Construction bundle handed to an adapter constructor by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub region: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_file_size: Option<u64>,
    pub max_duration: Option<u32>,
    pub supported_formats: Vec<String>,
    pub supported_languages: Vec<String>,
    pub extra: HashMap<String, String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            region: None,
            timeout: DEFAULT_ADAPTER_TIMEOUT,
            max_retries: 0,
            max_file_size: None,
            max_duration: None,
            supported_formats: Vec::new(),
            supported_languages: Vec::new(),
            extra: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdapterError {
    #[error("file too large: {size} bytes exceeds {max} bytes")]
    FileTooLarge { size: u64, max: u64 },
    #[error("duration too long: {duration}s exceeds {max}s")]
    DurationTooLong { duration: u32, max: u32 },
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("task not found: {0}")]
    TaskNotFound(String),
}

impl AdapterError {
    pub fn code(&self) -> &'static str {
        match self {
            AdapterError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AdapterError::DurationTooLong { .. } => "DURATION_TOO_LONG",
            AdapterError::UnsupportedLanguage(_) => "UNSUPPORTED_LANGUAGE",
            AdapterError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AdapterError::Network(_) => "NETWORK_ERROR",
            AdapterError::Api(_) => "API_ERROR",
            AdapterError::InvalidResponse(_) => "INVALID_RESPONSE",
            AdapterError::Config(_) => "CONFIG_ERROR",
            AdapterError::TaskNotFound(_) => "TASK_NOT_FOUND",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, AdapterError::Network(_))
    }
}
