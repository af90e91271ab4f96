use std::io;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::{TaskQuery, TaskStats};
use crate::application::services::{CreateTaskRequest, PreviewKind, ResultPreview, TaskError};
use crate::domain::{OutputFormat, Task, TaskId, TaskStatus, TranscriptionOptions};
use crate::presentation::state::AppState;

use super::{ApiError, CurrentUser};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub original_filename: String,
    pub file_size: u64,
    pub file_type: String,
    pub duration: Option<u32>,
    pub language: String,
    pub output_format: String,
    pub quality: String,
    pub priority: u8,
    pub status: String,
    pub progress: u8,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub result_text: Option<String>,
    pub confidence_score: Option<f64>,
    pub detected_language: Option<String>,
    pub quota_cost: i64,
    pub billing_duration: Option<u32>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            original_filename: task.original_filename,
            file_size: task.file_size,
            file_type: task.file_type,
            duration: task.duration,
            language: task.options.language,
            output_format: task.options.output_format.as_str().to_string(),
            quality: task.options.quality.as_str().to_string(),
            priority: task.options.priority,
            status: task.status.as_str().to_string(),
            progress: task.progress,
            error_code: task.error_code,
            error_message: task.error_message,
            result_text: task.result_text,
            confidence_score: task.confidence_score,
            detected_language: task.detected_language,
            quota_cost: task.quota_cost,
            billing_duration: task.billing_duration,
            created_at: task.created_at.to_rfc3339(),
            started_at: task.started_at.map(|t| t.to_rfc3339()),
            completed_at: task.completed_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Serialize)]
pub struct TaskStatsResponse {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
    pub processing_tasks: u64,
    pub total_duration: u64,
    pub total_file_size: u64,
    pub total_quota_cost: i64,
}

impl From<TaskStats> for TaskStatsResponse {
    fn from(stats: TaskStats) -> Self {
        Self {
            total_tasks: stats.total_tasks,
            completed_tasks: stats.completed_tasks,
            failed_tasks: stats.failed_tasks,
            processing_tasks: stats.processing_tasks,
            total_duration: stats.total_duration,
            total_file_size: stats.total_file_size,
            total_quota_cost: stats.total_quota_cost,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormatParams {
    pub format: Option<String>,
}

struct UploadForm {
    filename: String,
    data: Bytes,
    /// Client-declared size; the stored upload must match it.
    declared_size: Option<u64>,
    duration: Option<u32>,
    options: TranscriptionOptions,
}

fn parse_task_id(raw: &str) -> Result<TaskId, ApiError> {
    Uuid::parse_str(raw)
        .map(TaskId::from_uuid)
        .map_err(|_| ApiError::bad_request(format!("Invalid task ID: {raw}")))
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut declared_size = None;
    let mut duration = None;
    let mut options = TranscriptionOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let filename = field.file_name().unwrap_or("unknown").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
            file = Some((filename, data));
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read field {name}: {e}")))?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.as_str() {
            "language" => options.language = value.to_string(),
            "model_name" => options.model_name = Some(value.to_string()),
            "enable_timestamps" => options.enable_timestamps = parse_bool(value),
            "enable_speaker" => options.enable_speaker = parse_bool(value),
            "output_format" => {
                options.output_format = value
                    .parse()
                    .map_err(|_| TaskError::InvalidFormat(value.to_string()))?;
            }
            "quality" => {
                options.quality = value.parse().map_err(ApiError::bad_request)?;
            }
            "priority" => {
                options.priority = value
                    .parse()
                    .map_err(|_| ApiError::bad_request("priority must be an integer"))?;
            }
            "file_size" => {
                declared_size = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::bad_request("file_size must be an integer"))?,
                );
            }
            "duration" => {
                duration = Some(
                    value
                        .parse()
                        .map_err(|_| ApiError::bad_request("duration must be an integer"))?,
                );
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let (filename, data) = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    Ok(UploadForm {
        filename,
        data,
        declared_size,
        duration,
        options,
    })
}

/// Accepts an upload, creates the task and queues it. Responds before
/// transcription starts.
#[tracing::instrument(skip(state, multipart), fields(user_id = %user.user_id))]
pub async fn create_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_upload_form(multipart).await?;
    tracing::debug!(filename = %form.filename, bytes = form.data.len(), "Upload received");

    let request = CreateTaskRequest {
        user_id: user.user_id,
        token_id: user.token_id,
        filename: form.filename,
        file_size: form.declared_size.unwrap_or(form.data.len() as u64),
        duration: form.duration,
        options: form.options,
    };
    let task = state.orchestrator.create(request).await?;

    let data = form.data;
    let body = futures::stream::once(async move { Ok::<_, io::Error>(data) }).boxed();
    let task = state.orchestrator.process(task.id, body).await?;

    Ok((StatusCode::ACCEPTED, ApiResponse::ok(TaskResponse::from(task))))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn list_transcriptions_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<TaskStatus>)
        .transpose()
        .map_err(ApiError::bad_request)?;
    let query = TaskQuery::new(status, params.page, params.page_size);

    let (tasks, total) = state.orchestrator.list(user.user_id, &query).await?;
    Ok(ApiResponse::ok(TaskListResponse {
        tasks: tasks.into_iter().map(TaskResponse::from).collect(),
        total,
        page: query.page,
        page_size: query.page_size,
    }))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn get_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let task = state.orchestrator.get(task_id, user.user_id).await?;
    Ok(ApiResponse::ok(TaskResponse::from(task)))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn cancel_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let task = state.orchestrator.cancel(task_id, user.user_id).await?;
    Ok(ApiResponse::ok(TaskResponse::from(task)))
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn delete_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    state.orchestrator.delete(task_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn download_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
    Query(params): Query<FormatParams>,
) -> Result<Response, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let format = params
        .format
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(|f| {
            f.parse::<OutputFormat>()
                .map_err(|_| TaskError::InvalidFormat(f.to_string()))
        })
        .transpose()?;

    let download = state
        .orchestrator
        .download(task_id, user.user_id, format)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, download.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.file_name),
            ),
        ],
        Body::from(download.body),
    )
        .into_response())
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn preview_transcription_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<String>,
    Query(params): Query<FormatParams>,
) -> Result<Response, ApiError> {
    let task_id = parse_task_id(&task_id)?;
    let kind: PreviewKind = params.format.as_deref().unwrap_or("text").parse()?;

    let preview = state
        .orchestrator
        .preview(task_id, user.user_id, kind)
        .await?;
    let response = match preview {
        ResultPreview::Text(text) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        ResultPreview::Json(body) => (
            [(header::CONTENT_TYPE, OutputFormat::Json.mime_type())],
            Body::from(body),
        )
            .into_response(),
    };
    Ok(response)
}

#[tracing::instrument(skip(state), fields(user_id = %user.user_id))]
pub async fn transcription_stats_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.orchestrator.stats(user.user_id).await?;
    Ok(ApiResponse::ok(TaskStatsResponse::from(stats)))
}
