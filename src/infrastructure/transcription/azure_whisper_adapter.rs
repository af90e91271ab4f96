use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;

use crate::application::ports::{AdapterConfig, AdapterError, TranscriptionAdapter};
use crate::application::services::capabilities;
use crate::domain::{EngineType, Task, TaskId, TranscriptionResult};

use super::whisper_api;

pub const AZURE_DEFAULT_DEPLOYMENT: &str = "whisper";
pub const AZURE_DEFAULT_API_VERSION: &str = "2024-06-01";
const AZURE_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;
const AZURE_FORMATS: &[&str] = &["mp3", "mp4", "wav", "m4a", "flac", "ogg", "webm"];

#[derive(Debug, Clone)]
pub struct AzureWhisperConfig {
    pub api_key: String,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub max_file_size: u64,
    pub max_duration: u32,
    pub formats: Vec<String>,
    pub languages: Vec<String>,
}

impl AzureWhisperConfig {
    fn transcription_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/audio/transcriptions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    fn deployment_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

/// `base_url` is the resource endpoint; without one, `region` and the
/// `resource` extra build `https://{resource}.openai.azure.com`.
impl TryFrom<AdapterConfig> for AzureWhisperConfig {
    type Error = AdapterError;

    fn try_from(config: AdapterConfig) -> Result<Self, Self::Error> {
        if config.api_key.trim().is_empty() {
            return Err(AdapterError::Config("Azure Whisper requires an API key".to_string()));
        }
        let endpoint = match (config.base_url.as_deref(), config.extra.get("resource")) {
            (Some(url), _) if !url.trim().is_empty() => url.trim_end_matches('/').to_string(),
            (_, Some(resource)) => format!("https://{resource}.openai.azure.com"),
            _ => {
                return Err(AdapterError::Config(
                    "Azure Whisper requires a base url or a resource name".to_string(),
                ));
            }
        };
        Ok(Self {
            api_key: config.api_key,
            endpoint,
            deployment: config
                .extra
                .get("deployment")
                .cloned()
                .unwrap_or_else(|| AZURE_DEFAULT_DEPLOYMENT.to_string()),
            api_version: config
                .extra
                .get("api_version")
                .cloned()
                .unwrap_or_else(|| AZURE_DEFAULT_API_VERSION.to_string()),
            timeout: config.timeout,
            max_retries: config.max_retries,
            max_file_size: capabilities::resolve_max_file_size(
                config.max_file_size,
                Some(AZURE_MAX_FILE_SIZE),
            ),
            max_duration: capabilities::resolve_max_duration(config.max_duration, None),
            formats: capabilities::resolve_formats(&config.supported_formats, AZURE_FORMATS),
            languages: capabilities::resolve_languages(&config.supported_languages, &[]),
        })
    }
}

/// Whisper deployed on Azure OpenAI. Same synchronous contract as the OpenAI
/// adapter; the model is fixed by the deployment.
pub struct AzureWhisperAdapter {
    client: reqwest::Client,
    config: AzureWhisperConfig,
    results: DashMap<TaskId, TranscriptionResult>,
}

impl AzureWhisperAdapter {
    pub fn new(config: AzureWhisperConfig) -> Result<Self, AdapterError> {
        Ok(Self {
            client: whisper_api::http_client(config.timeout)?,
            config,
            results: DashMap::new(),
        })
    }

    pub fn from_adapter_config(config: AdapterConfig) -> Result<Self, AdapterError> {
        Self::new(AzureWhisperConfig::try_from(config)?)
    }
}

#[async_trait]
impl TranscriptionAdapter for AzureWhisperAdapter {
    fn engine_type(&self) -> EngineType {
        EngineType::Azure
    }

    fn engine_name(&self) -> &str {
        "Azure OpenAI Whisper"
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

        let url = self.config.transcription_url();
        tracing::debug!(deployment = %self.config.deployment, "Sending audio to Azure OpenAI Whisper");
        let response = whisper_api::send_with_retry(self.config.max_retries, || {
            let form = whisper_api::transcription_form(task, audio.clone(), None)?;
            Ok(self
                .client
                .post(&url)
                .header("api-key", &self.config.api_key)
                .multipart(form))
        })
        .await?;

        let result = whisper_api::parse_verbose(response).await?;
        task.record_result(&result)
            .map_err(|e| AdapterError::TaskNotFound(e.to_string()))?;

        tracing::info!(
            chars = result.text.len(),
            "Azure OpenAI Whisper transcription completed"
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
        let response = self
            .client
            .get(self.config.deployment_url())
            .header("api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| AdapterError::Network(e.to_string()))?;
        whisper_api::expect_ok(response.status())
    }
}
