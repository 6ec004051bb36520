//! Manual trigger for the reconciliation sweep.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use shared::ApiResponse;
use tracing::info;

use crate::rest::{error_response, AppState};

/// POST /api/reconciliation/run
pub async fn run_reconciliation(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/reconciliation/run");

    match state.reconciliation.run_today().await {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::ok(outcome))).into_response(),
        Err(e) => error_response("Reconciliation run failed", e),
    }
}
