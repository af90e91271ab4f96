use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;

use crate::application::ports::{AdapterConfig, AdapterError, TranscriptionAdapter};
use crate::application::services::capabilities;
use crate::domain::{EngineType, Task, TaskId, TranscriptionResult};

use super::whisper_api;

pub const OPENAI_DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const OPENAI_DEFAULT_MODEL: &str = "whisper-1";
const OPENAI_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;
const OPENAI_MAX_DURATION: u32 = 3600;
const OPENAI_FORMATS: &[&str] = &["mp3", "mp4", "wav", "m4a", "flac", "webm"];
const OPENAI_LANGUAGES: &[&str] = &[
    "auto", "zh", "en", "ja", "ko", "es", "fr", "de", "ru", "it", "pt", "ar", "hi", "th", "vi",
    "nl", "pl", "tr", "sv", "da", "no", "fi",
];

#[derive(Debug, Clone)]
pub struct OpenAiWhisperConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_file_size: u64,
    pub max_duration: u32,
    pub formats: Vec<String>,
    pub languages: Vec<String>,
}

impl TryFrom<AdapterConfig> for OpenAiWhisperConfig {
    type Error = AdapterError;

    fn try_from(config: AdapterConfig) -> Result<Self, Self::Error> {
        if config.api_key.trim().is_empty() {
            return Err(AdapterError::Config("OpenAI Whisper requires an API key".to_string()));
        }
        let base_url = config
            .base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AdapterError::Config(format!("invalid base url: {base_url}")));
        }
        Ok(Self {
            api_key: config.api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config
                .extra
                .get("model")
                .cloned()
                .unwrap_or_else(|| OPENAI_DEFAULT_MODEL.to_string()),
            timeout: config.timeout,
            max_retries: config.max_retries,
            max_file_size: capabilities::resolve_max_file_size(
                config.max_file_size,
                Some(OPENAI_MAX_FILE_SIZE),
            ),
            max_duration: capabilities::resolve_max_duration(
                config.max_duration,
                Some(OPENAI_MAX_DURATION),
            ),
            formats: capabilities::resolve_formats(&config.supported_formats, OPENAI_FORMATS),
            languages: capabilities::resolve_languages(
                &config.supported_languages,
                OPENAI_LANGUAGES,
            ),
        })
    }
}

/// OpenAI's synchronous `/v1/audio/transcriptions` endpoint.
///
/// `submit` blocks until the transcript is back, so the task is terminal when
/// it returns. Results are kept per task so `get_result` can hand back the
/// segments and words, not only the text stored on the task.
pub struct OpenAiWhisperAdapter {
    client: reqwest::Client,
    config: OpenAiWhisperConfig,
    results: DashMap<TaskId, TranscriptionResult>,
}

impl OpenAiWhisperAdapter {
    pub fn new(config: OpenAiWhisperConfig) -> Result<Self, AdapterError> {
        Ok(Self {
            client: whisper_api::http_client(config.timeout)?,
            config,
            results: DashMap::new(),
        })
    }

    pub fn from_adapter_config(config: AdapterConfig) -> Result<Self, AdapterError> {
        Self::new(OpenAiWhisperConfig::try_from(config)?)
    }
}

#[async_trait]
impl TranscriptionAdapter for OpenAiWhisperAdapter {
    fn engine_type(&self) -> EngineType {
        EngineType::Whisper
    }

    fn engine_name(&self) -> &str {
        "OpenAI Whisper"
    }

    fn supported_formats(&self) -> Vec<String> {
        self.config.formats.clone()
    }

    fn supported_languages(&self) -> Vec<String> {
        self.config.languages.clone()
    }

    fn supported_output_formats(&self) -> Vec<String> {
        capabilities::output_formats()
    }

    fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }

    fn max_duration(&self) -> u32 {
        self.config.max_duration
    }

    fn validate_file(&self, size_bytes: u64, duration: Option<u32>) -> Result<(), AdapterError> {
        capabilities::check_file(
            size_bytes,
            duration,
            self.config.max_file_size,
            self.config.max_duration,
        )
    }

    fn validate_config(&self, task: &Task) -> Result<(), AdapterError> {
        capabilities::check_options(task, &self.config.languages, &self.supported_output_formats())
    }

    #[tracing::instrument(skip(self, task, audio), fields(task_id = %task.id, bytes = audio.len()))]
    async fn submit(&self, task: &mut Task, audio: Bytes) -> Result<(), AdapterError> {
        self.validate_config(task)?;

        let url = format!("{}/v1/audio/transcriptions", self.config.base_url);
        let model = task
            .options
            .model_name
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.config.model.clone());

        tracing::debug!(model = %model, "Sending audio to OpenAI Whisper API");
        let response = whisper_api::send_with_retry(self.config.max_retries, || {
            let form = whisper_api::transcription_form(task, audio.clone(), Some(&model))?;
            Ok(self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .multipart(form))
        })
        .await?;

        let result = whisper_api::parse_verbose(response).await?;
        task.record_result(&result)
            .map_err(|e| AdapterError::TaskNotFound(e.to_string()))?;

        tracing::info!(
            chars = result.text.len(),
            segments = result.segments.len(),
            "OpenAI Whisper transcription completed"
        );
        self.results.insert(task.id, result);
        Ok(())
    }

    async fn query_status(&self, task: &mut Task) -> Result<(), AdapterError> {
        capabilities::apply_timeout(task, self.config.timeout, Utc::now())
    }

    async fn get_result(&self, task: &Task) -> Result<TranscriptionResult, AdapterError> {
        let fallback = capabilities::result_from_task(task)?;
        Ok(self
            .results
            .get(&task.id)
            .map(|r| r.clone())
            .unwrap_or(fallback))
    }

    async fn cancel(&self, task: &mut Task) -> Result<(), AdapterError> {
        capabilities::cancel_locally(task)
    }

    async fn health_check(&self) -> Result<(), AdapterError> {
        let url = format!("{}/v1/models", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| AdapterError::Network(e.to_string()))?;
        whisper_api::expect_ok(response.status())
    }
}
