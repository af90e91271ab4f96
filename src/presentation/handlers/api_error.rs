use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::QuotaError;
use crate::application::services::{ChannelAdminError, SelectionError, TaskError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

/// Error body shared by every endpoint: `{success: false, error, code}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        let status = match &e {
            TaskError::FileNotSupported(_)
            | TaskError::FileTooLarge { .. }
            | TaskError::DurationTooLong { .. }
            | TaskError::UnsupportedLanguage(_)
            | TaskError::InvalidFormat(_)
            | TaskError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TaskError::Quota(QuotaError::Insufficient { .. }) => StatusCode::FORBIDDEN,
            TaskError::Quota(QuotaError::UnknownUser(_)) => StatusCode::FORBIDDEN,
            TaskError::Quota(QuotaError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            TaskError::Selection(SelectionError::EngineUnavailable { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            TaskError::Selection(SelectionError::Repository(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TaskError::NotFound(_) | TaskError::FileNotFound(_) => StatusCode::NOT_FOUND,
            TaskError::AlreadyFinished(_)
            | TaskError::InvalidState(_)
            | TaskError::ResultNotReady(_) => StatusCode::CONFLICT,
            TaskError::QueueFull | TaskError::QueueClosed => StatusCode::SERVICE_UNAVAILABLE,
            TaskError::UploadFailed(_) | TaskError::Repository(_) | TaskError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %e, code = e.code(), "Request failed");
        }
        Self::new(status, e.code(), e.to_string())
    }
}

impl From<ChannelAdminError> for ApiError {
    fn from(e: ChannelAdminError) -> Self {
        let status = match &e {
            ChannelAdminError::NotFound(_) => StatusCode::NOT_FOUND,
            ChannelAdminError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ChannelAdminError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.code(), e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response()
    }
}
