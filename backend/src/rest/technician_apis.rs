//! Endpoints for technician listings and manual balance adjustments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use shared::{ApiResponse, UpdatePendingDaysRequest};
use tracing::info;

use crate::rest::{error_response, AppState};

/// GET /api/technicians
pub async fn list_technicians(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/technicians");

    match state.technician_service.list().await {
        Ok(technicians) => (StatusCode::OK, Json(ApiResponse::ok(technicians))).into_response(),
        Err(e) => error_response("Failed to list technicians", e),
    }
}

/// PUT /api/technicians/:technician_id/pending-days
pub async fn update_pending_days(
    State(state): State<AppState>,
    Path(technician_id): Path<String>,
    Json(request): Json<UpdatePendingDaysRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/technicians/{}/pending-days - request: {:?}",
        technician_id, request
    );

    match state
        .technician_service
        .set_pending_days(&technician_id, request.pending_days)
        .await
    {
        Ok(technician) => (StatusCode::OK, Json(ApiResponse::ok(technician))).into_response(),
        Err(e) => error_response("Failed to update pending days", e),
    }
}
