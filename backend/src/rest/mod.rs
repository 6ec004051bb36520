//! # REST API layer
//!
//! HTTP endpoints for the on-call ledger. This layer handles:
//! - request/response serialization and the uniform `{success, data | error}`
//!   envelope
//! - translation of domain errors to HTTP status codes
//! - request logging
//!
//! No business rule lives here; handlers map each verb+path to exactly one
//! service operation.

pub mod reconciliation_apis;
pub mod rest_day_apis;
pub mod shift_apis;
pub mod technician_apis;

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::Utc;
use shared::{ApiResponse, HealthResponse, StartupReconciliation};
use tokio::sync::RwLock;
use tracing::error;

use crate::domain::{
    LedgerError, ReconciliationJob, RestDayService, ShiftService, TechnicianService,
};
use crate::storage::db::DbConnection;

/// Application state shared across handlers. Everything hangs off the one
/// injected database handle; there is no global connection state.
#[derive(Clone)]
pub struct AppState {
    pub technician_service: TechnicianService,
    pub shift_service: ShiftService,
    pub rest_day_service: RestDayService,
    pub reconciliation: ReconciliationJob,
    /// Outcome of the reconciliation run kicked off at startup, reported by
    /// the health endpoint.
    pub startup_reconciliation: Arc<RwLock<StartupReconciliation>>,
}

impl AppState {
    pub fn new(db: DbConnection) -> Self {
        Self {
            technician_service: TechnicianService::new(db.clone()),
            shift_service: ShiftService::new(db.clone()),
            rest_day_service: RestDayService::new(db.clone()),
            reconciliation: ReconciliationJob::new(db),
            startup_reconciliation: Arc::new(RwLock::new(StartupReconciliation::Pending)),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/technicians", get(technician_apis::list_technicians))
        .route(
            "/technicians/:technician_id/pending-days",
            put(technician_apis::update_pending_days),
        )
        .route(
            "/shifts",
            get(shift_apis::list_shifts).post(shift_apis::create_shift),
        )
        .route("/shifts/:shift_id", delete(shift_apis::delete_shift))
        .route(
            "/rest-days",
            get(rest_day_apis::list_rest_days).post(rest_day_apis::create_rest_day),
        )
        .route(
            "/rest-days/:rest_day_id",
            delete(rest_day_apis::delete_rest_day),
        )
        .route(
            "/reconciliation/run",
            post(reconciliation_apis::run_reconciliation),
        );

    Router::new()
        .nest("/api", api)
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

/// Translate a domain error into the envelope and the right status code.
///
/// Storage detail is logged but never returned to the caller.
pub(crate) fn error_response(context: &str, err: LedgerError) -> Response {
    error!("{}: {}", context, err);

    let status = match &err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        // Balance refusal is a client error on this API, not a 409.
        LedgerError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
        LedgerError::Conflict(_) => StatusCode::CONFLICT,
        LedgerError::Storage(_) | LedgerError::ReconciliationIncomplete { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let message = match &err {
        LedgerError::Storage(_) => "internal storage error".to_string(),
        LedgerError::ReconciliationIncomplete { processed, .. } => {
            format!("reconciliation incomplete, {} rest days processed", processed)
        }
        other => other.to_string(),
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// Liveness plus readiness: reports the startup reconciliation outcome and
/// turns 503 when that run failed.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let startup = state.startup_reconciliation.read().await.clone();
    let (status, label) = match &startup {
        StartupReconciliation::Failed { .. } => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        _ => (StatusCode::OK, "ok"),
    };

    let body = HealthResponse {
        status: label.to_string(),
        timestamp: Utc::now(),
        startup_reconciliation: startup,
    };
    (status, Json(ApiResponse::ok(body)))
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(format!(
            "route not found: {}",
            uri.path()
        ))),
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shared::ReconciliationOutcome;

    pub(crate) async fn setup_test_state() -> AppState {
        let db = DbConnection::init_test().await.expect("test db");
        AppState::new(db)
    }

    pub(crate) async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn test_error_response_statuses() {
        let cases = [
            (LedgerError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (LedgerError::InvalidArgument("x".into()), StatusCode::BAD_REQUEST),
            (
                LedgerError::InsufficientBalance {
                    technician_id: "t".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (LedgerError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                LedgerError::Storage(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                LedgerError::ReconciliationIncomplete {
                    processed: 1,
                    source: Box::new(LedgerError::Storage(sqlx::Error::PoolClosed)),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let response = error_response("test", err);
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_response_hides_storage_detail() {
        let response = error_response("test", LedgerError::Storage(sqlx::Error::PoolClosed));
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "internal storage error");
    }

    #[tokio::test]
    async fn test_error_response_reports_partial_reconciliation() {
        let response = error_response(
            "test",
            LedgerError::ReconciliationIncomplete {
                processed: 3,
                source: Box::new(LedgerError::Storage(sqlx::Error::PoolClosed)),
            },
        );
        let json = body_json(response).await;
        assert_eq!(json["error"], "reconciliation incomplete, 3 rest days processed");
    }

    #[tokio::test]
    async fn test_health_reports_pending_startup_run() {
        let state = setup_test_state().await;
        let response = health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["startup_reconciliation"]["state"], "pending");
    }

    #[tokio::test]
    async fn test_health_degrades_when_startup_run_failed() {
        let state = setup_test_state().await;
        *state.startup_reconciliation.write().await = StartupReconciliation::Failed {
            error: "storage unreachable".to_string(),
        };

        let response = health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_reports_completed_startup_run() {
        let state = setup_test_state().await;
        *state.startup_reconciliation.write().await =
            StartupReconciliation::Completed(ReconciliationOutcome {
                date: chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                processed: 2,
                skipped: 0,
            });

        let response = health(State(state)).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["startup_reconciliation"]["state"], "completed");
        assert_eq!(json["data"]["startup_reconciliation"]["processed"], 2);
    }

    #[tokio::test]
    async fn test_fallback_names_the_unknown_route() {
        let response = not_found("/api/nope".parse::<Uri>().unwrap())
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "route not found: /api/nope");
    }
}
