//! Endpoints for taking and revoking compensatory rest days.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use shared::{ApiResponse, CreateRestDayRequest};
use tracing::info;

use crate::rest::{error_response, AppState};

/// GET /api/rest-days
pub async fn list_rest_days(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/rest-days");

    match state.rest_day_service.list().await {
        Ok(rest_days) => (StatusCode::OK, Json(ApiResponse::ok(rest_days))).into_response(),
        Err(e) => error_response("Failed to list rest days", e),
    }
}

/// POST /api/rest-days
pub async fn create_rest_day(
    State(state): State<AppState>,
    Json(request): Json<CreateRestDayRequest>,
) -> impl IntoResponse {
    info!("POST /api/rest-days - request: {:?}", request);

    match state.rest_day_service.create(request).await {
        Ok(rest_day) => (StatusCode::CREATED, Json(ApiResponse::ok(rest_day))).into_response(),
        Err(e) => error_response("Failed to create rest day", e),
    }
}

/// DELETE /api/rest-days/:rest_day_id
pub async fn delete_rest_day(
    State(state): State<AppState>,
    Path(rest_day_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/rest-days/{}", rest_day_id);

    match state.rest_day_service.delete(&rest_day_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok("rest day deleted".to_string())),
        )
            .into_response(),
        Err(e) => error_response("Failed to delete rest day", e),
    }
}
