use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of days an on-call shift spans (inclusive of the start date).
pub const SHIFT_LENGTH_DAYS: i64 = 7;

/// A field technician whose on-call and rest-day balance is tracked.
///
/// Technicians are seeded out-of-band and never deleted, only deactivated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technician {
    /// Technician ID in format: "technician::<uuid>"
    pub id: String,
    pub name: String,
    pub email: String,
    /// Current balance of unredeemed compensatory days (never negative)
    pub pending_days: i64,
    /// Inactive technicians cannot be assigned new shifts
    pub active: bool,
}

impl Technician {
    pub fn generate_id() -> String {
        format!("technician::{}", Uuid::new_v4())
    }
}

/// A 7-day on-call assignment ("guardia") starting on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Shift ID in format: "shift::<uuid>"
    pub id: String,
    pub technician_id: String,
    pub start_date: NaiveDate,
    /// Always start_date + 6 days; computed, never supplied by callers
    pub end_date: NaiveDate,
    /// Opaque identifier of an external calendar event, never interpreted
    pub external_event_id: Option<String>,
}

impl Shift {
    pub fn generate_id() -> String {
        format!("shift::{}", Uuid::new_v4())
    }

    /// Compute the inclusive end date for a shift starting on `start_date`.
    pub fn end_date_for(start_date: NaiveDate) -> NaiveDate {
        start_date + Duration::days(SHIFT_LENGTH_DAYS - 1)
    }
}

/// A single compensatory day off ("descanso") drawn against a technician's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestDay {
    /// Rest day ID in format: "restday::<uuid>"
    pub id: String,
    pub technician_id: String,
    pub date: NaiveDate,
    /// Set to true exactly once by the reconciliation sweep
    pub processed: bool,
    pub processed_at: Option<DateTime<Utc>>,
    /// Opaque identifier of an external calendar event, never interpreted
    pub external_event_id: Option<String>,
}

impl RestDay {
    pub fn generate_id() -> String {
        format!("restday::{}", Uuid::new_v4())
    }
}

/// Technician identity fields attached to joined shift/rest-day listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A shift joined to its owning technician for listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftWithTechnician {
    #[serde(flatten)]
    pub shift: Shift,
    pub technician: TechnicianRef,
}

/// A rest day joined to its owning technician for listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestDayWithTechnician {
    #[serde(flatten)]
    pub rest_day: RestDay,
    pub technician: TechnicianRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateShiftRequest {
    pub technician_id: String,
    pub start_date: NaiveDate,
    pub external_event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRestDayRequest {
    pub technician_id: String,
    pub date: NaiveDate,
    pub external_event_id: Option<String>,
}

/// Manual balance adjustment. The value is optional so a missing field can be
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePendingDaysRequest {
    pub pending_days: Option<i64>,
}

/// Summary of one reconciliation sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutcome {
    /// The day the sweep ran for
    pub date: NaiveDate,
    /// Rest days transitioned to processed by this run
    pub processed: u64,
    /// Rest days for the day that were already processed
    pub skipped: u64,
}

/// Outcome of the reconciliation run triggered at process start,
/// as reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StartupReconciliation {
    Pending,
    Completed(ReconciliationOutcome),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub startup_reconciliation: StartupReconciliation,
}

/// Uniform JSON envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
