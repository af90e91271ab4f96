//! Wire types and request plumbing shared by the Whisper-family adapters.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{RequestBuilder, Response, StatusCode, multipart};
use serde::Deserialize;

use crate::application::ports::AdapterError;
use crate::domain::{OutputFormat, Task, TranscriptionResult, TranscriptionSegment, TranscriptionWord, mime_for_format};

const BASE_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
pub(super) struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: String,
    #[serde(default)]
    duration: f64,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    id: i64,
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    avg_logprob: f64,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps an average log-probability onto `[0, 1]`.
pub fn confidence_from_logprob(avg_logprob: f64) -> f64 {
    (1.0 + avg_logprob / 10.0).clamp(0.0, 1.0)
}

impl VerboseTranscription {
    pub(super) fn into_result(self) -> TranscriptionResult {
        let confidence_score = if self.segments.is_empty() {
            0.0
        } else {
            let total: f64 = self.segments.iter().map(|s| s.avg_logprob).sum();
            confidence_from_logprob(total / self.segments.len() as f64)
        };

        let segments = self
            .segments
            .into_iter()
            .map(|s| TranscriptionSegment {
                id: s.id,
                start: s.start,
                end: s.end,
                text: s.text.trim().to_string(),
                speaker: None,
                confidence: confidence_from_logprob(s.avg_logprob),
            })
            .collect();

        let words = self
            .words
            .into_iter()
            .map(|w| TranscriptionWord {
                word: w.word.trim().to_string(),
                start: w.start,
                end: w.end,
                confidence: confidence_score,
            })
            .collect();

        TranscriptionResult {
            text: self.text.trim().to_string(),
            language: self.language,
            duration: self.duration,
            confidence_score,
            segments,
            words,
            speakers: Vec::new(),
        }
    }
}

/// Multipart body for a `verbose_json` transcription request. Word
/// timestamps are only asked for when the caller wants JSON output.
pub(super) fn transcription_form(
    task: &Task,
    audio: Bytes,
    model: Option<&str>,
) -> Result<multipart::Form, AdapterError> {
    let length = audio.len() as u64;
    let file = multipart::Part::stream_with_length(audio, length)
        .file_name(task.original_filename.clone())
        .mime_str(mime_for_format(&task.file_type))
        .map_err(|e| AdapterError::Config(format!("invalid mime type: {e}")))?;

    let mut form = multipart::Form::new()
        .part("file", file)
        .text("response_format", "verbose_json")
        .text("temperature", "0");
    if let Some(model) = model {
        form = form.text("model", model.to_string());
    }
    let language = task.options.language.as_str();
    if !language.is_empty() && language != crate::domain::AUTO_LANGUAGE {
        form = form.text("language", language.to_string());
    }
    if task.options.enable_timestamps {
        form = form.text("timestamp_granularities[]", "segment");
        if task.options.output_format == OutputFormat::Json {
            form = form.text("timestamp_granularities[]", "word");
        }
    }
    Ok(form)
}

/// Sends the request built by `build`, retrying transport failures and 5xx
/// responses up to `max_retries` times with exponential back-off.
pub(super) async fn send_with_retry<F>(max_retries: u32, build: F) -> Result<Response, AdapterError>
where
    F: Fn() -> Result<RequestBuilder, AdapterError>,
{
    let mut attempt = 0;
    loop {
        let error = match build()?.send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) if response.status().is_server_error() => api_error(response).await,
            Ok(response) => return Err(api_error(response).await),
            Err(e) => AdapterError::Network(e.to_string()),
        };
        if attempt >= max_retries {
            return Err(error);
        }
        let backoff = BASE_BACKOFF
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_BACKOFF);
        attempt += 1;
        tracing::warn!(attempt, error = %error, backoff_ms = backoff.as_millis() as u64, "Retrying transcription request");
        tokio::time::sleep(backoff).await;
    }
}

async fn api_error(response: Response) -> AdapterError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    AdapterError::Api(format!("status {}: {}", status.as_u16(), message))
}

pub(super) async fn parse_verbose(response: Response) -> Result<TranscriptionResult, AdapterError> {
    let body = response
        .text()
        .await
        .map_err(|e| AdapterError::Network(format!("reading response: {e}")))?;
    let parsed: VerboseTranscription = serde_json::from_str(&body)
        .map_err(|e| AdapterError::InvalidResponse(e.to_string()))?;
    Ok(parsed.into_result())
}

pub(super) fn expect_ok(status: StatusCode) -> Result<(), AdapterError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(AdapterError::Api(format!("health check returned {}", status.as_u16())))
    }
}

pub(super) fn http_client(timeout: Duration) -> Result<reqwest::Client, AdapterError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AdapterError::Config(format!("http client: {e}")))
}
