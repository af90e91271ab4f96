use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::services::ChannelTestReport;
use crate::domain::{ChannelId, ChannelStatus};
use crate::presentation::state::AppState;

use super::{ApiError, ApiResponse};

#[derive(Debug, Serialize)]
pub struct ChannelTestResponse {
    pub channel_id: String,
    pub healthy: bool,
    pub status: String,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl From<ChannelTestReport> for ChannelTestResponse {
    fn from(report: ChannelTestReport) -> Self {
        Self {
            channel_id: report.channel_id.to_string(),
            healthy: report.healthy,
            status: report.status.as_str().to_string(),
            error: report.error,
            elapsed_ms: report.elapsed_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BatchStatusRequest {
    pub ids: Vec<String>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    pub updated: u64,
}

fn parse_channel_id(raw: &str) -> Result<ChannelId, ApiError> {
    Uuid::parse_str(raw)
        .map(ChannelId::from_uuid)
        .map_err(|_| ApiError::bad_request(format!("Invalid channel ID: {raw}")))
}

#[tracing::instrument(skip(state))]
pub async fn test_channel_handler(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = parse_channel_id(&channel_id)?;
    let report = state.channel_health.test_channel(channel_id).await?;
    Ok(ApiResponse::ok(ChannelTestResponse::from(report)))
}

#[tracing::instrument(skip(state, request), fields(count = request.ids.len()))]
pub async fn update_channel_status_handler(
    State(state): State<AppState>,
    Json(request): Json<BatchStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status: ChannelStatus = request.status.parse().map_err(ApiError::bad_request)?;
    let ids = request
        .ids
        .iter()
        .map(|id| parse_channel_id(id))
        .collect::<Result<Vec<_>, _>>()?;

    let updated = state.channel_health.update_status(&ids, status).await?;
    Ok(ApiResponse::ok(BatchStatusResponse { updated }))
}
