//! Endpoints for assigning and revoking on-call shifts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use shared::{ApiResponse, CreateShiftRequest};
use tracing::info;

use crate::rest::{error_response, AppState};

/// GET /api/shifts
pub async fn list_shifts(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/shifts");

    match state.shift_service.list().await {
        Ok(shifts) => (StatusCode::OK, Json(ApiResponse::ok(shifts))).into_response(),
        Err(e) => error_response("Failed to list shifts", e),
    }
}

/// POST /api/shifts
pub async fn create_shift(
    State(state): State<AppState>,
    Json(request): Json<CreateShiftRequest>,
) -> impl IntoResponse {
    info!("POST /api/shifts - request: {:?}", request);

    match state.shift_service.create(request).await {
        Ok(shift) => (StatusCode::CREATED, Json(ApiResponse::ok(shift))).into_response(),
        Err(e) => error_response("Failed to create shift", e),
    }
}

/// DELETE /api/shifts/:shift_id
pub async fn delete_shift(
    State(state): State<AppState>,
    Path(shift_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/shifts/{}", shift_id);

    match state.shift_service.delete(&shift_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok("shift deleted".to_string())),
        )
            .into_response(),
        Err(e) => error_response("Failed to delete shift", e),
    }
}
