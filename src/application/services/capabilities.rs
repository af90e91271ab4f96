//! Capability fallbacks shared by every adapter.
//!
//! Adapters call these explicitly: a value configured on the channel wins,
//! then the engine's own default, then the system-wide default.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::application::ports::AdapterError;
use crate::domain::{
    OutputFormat, SUPPORTED_LANGUAGES, Task, TaskStatus, TranscriptionResult,
    all_supported_formats,
};

pub const SYSTEM_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const SYSTEM_MAX_DURATION: u32 = 3600;

pub fn resolve_list(configured: &[String], engine_default: &[&str]) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }
    if !engine_default.is_empty() {
        return engine_default.iter().map(|s| s.to_string()).collect();
    }
    Vec::new()
}

pub fn resolve_formats(configured: &[String], engine_default: &[&str]) -> Vec<String> {
    let resolved = resolve_list(configured, engine_default);
    if resolved.is_empty() {
        all_supported_formats().into_iter().map(String::from).collect()
    } else {
        resolved
    }
}

pub fn resolve_languages(configured: &[String], engine_default: &[&str]) -> Vec<String> {
    let resolved = resolve_list(configured, engine_default);
    if resolved.is_empty() {
        SUPPORTED_LANGUAGES.iter().map(|s| s.to_string()).collect()
    } else {
        resolved
    }
}

pub fn output_formats() -> Vec<String> {
    OutputFormat::ALL.iter().map(|f| f.as_str().to_string()).collect()
}

/// Zero counts as unset.
pub fn resolve_max_file_size(configured: Option<u64>, engine_default: Option<u64>) -> u64 {
    configured
        .filter(|v| *v > 0)
        .or(engine_default.filter(|v| *v > 0))
        .unwrap_or(SYSTEM_MAX_FILE_SIZE)
}

pub fn resolve_max_duration(configured: Option<u32>, engine_default: Option<u32>) -> u32 {
    configured
        .filter(|v| *v > 0)
        .or(engine_default.filter(|v| *v > 0))
        .unwrap_or(SYSTEM_MAX_DURATION)
}

pub fn check_file(
    size_bytes: u64,
    duration: Option<u32>,
    max_file_size: u64,
    max_duration: u32,
) -> Result<(), AdapterError> {
    if size_bytes > max_file_size {
        return Err(AdapterError::FileTooLarge {
            size: size_bytes,
            max: max_file_size,
        });
    }
    if let Some(duration) = duration {
        if duration > max_duration {
            return Err(AdapterError::DurationTooLong {
                duration,
                max: max_duration,
            });
        }
    }
    Ok(())
}

/// `auto` is accepted by every adapter.
pub fn check_options(
    task: &Task,
    languages: &[String],
    output_formats: &[String],
) -> Result<(), AdapterError> {
    let language = task.options.language.as_str();
    if language != crate::domain::AUTO_LANGUAGE && !languages.iter().any(|l| l == language) {
        return Err(AdapterError::UnsupportedLanguage(language.to_string()));
    }
    let format = task.options.output_format.as_str();
    if !output_formats.iter().any(|f| f == format) {
        return Err(AdapterError::UnsupportedFormat(format.to_string()));
    }
    Ok(())
}

/// Fails a task that is still `processing` once `timeout` has passed since
/// it was created.
pub fn apply_timeout(
    task: &mut Task,
    timeout: Duration,
    now: DateTime<Utc>,
) -> Result<(), AdapterError> {
    if task.status != TaskStatus::Processing {
        return Ok(());
    }
    let expired = task
        .elapsed_since_creation(now)
        .to_std()
        .is_ok_and(|elapsed| elapsed > timeout);
    if expired {
        task.mark_failed(
            "TIMEOUT",
            format!("task exceeded the {}s timeout", timeout.as_secs()),
        )
        .map_err(|e| AdapterError::TaskNotFound(e.to_string()))?;
    }
    Ok(())
}

/// Local-only cancellation for back-ends that cannot stop work in flight.
pub fn cancel_locally(task: &mut Task) -> Result<(), AdapterError> {
    if task.is_terminal() {
        return Err(AdapterError::TaskNotFound(format!(
            "task already {}",
            task.status
        )));
    }
    task.mark_cancelled("cancelled")
        .map_err(|e| AdapterError::TaskNotFound(e.to_string()))
}

/// Rebuilds a result from what a completed task recorded.
pub fn result_from_task(task: &Task) -> Result<TranscriptionResult, AdapterError> {
    if task.status != TaskStatus::Completed {
        return Err(AdapterError::TaskNotFound(format!(
            "task {} is {}, not completed",
            task.id, task.status
        )));
    }
    let text = task
        .result_text
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AdapterError::TaskNotFound(format!("task {} has no result text", task.id)))?;

    let mut result = TranscriptionResult::new(text);
    result.language = task.detected_language.clone().unwrap_or_default();
    result.confidence_score = task.confidence_score.unwrap_or_default();
    result.duration = task.duration.map(f64::from).unwrap_or_default();
    Ok(result)
}
