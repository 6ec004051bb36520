use shared::{CreateShiftRequest, Shift, ShiftWithTechnician};
use tracing::info;

use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;
use crate::storage::repositories::ShiftRepository;

/// Service for assigning and revoking on-call shifts.
#[derive(Clone)]
pub struct ShiftService {
    shifts: ShiftRepository,
}

impl ShiftService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            shifts: ShiftRepository::new(db),
        }
    }

    /// List all shifts joined to their technician, ordered by start date.
    pub async fn list(&self) -> Result<Vec<ShiftWithTechnician>, LedgerError> {
        let shifts = self.shifts.list_with_technician().await?;
        info!("Found {} shifts", shifts.len());
        Ok(shifts)
    }

    /// Assign a one-week shift starting on the requested date and credit the
    /// technician one pending day. The end date is always computed here.
    pub async fn create(&self, request: CreateShiftRequest) -> Result<Shift, LedgerError> {
        if request.technician_id.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(
                "technician_id is required".to_string(),
            ));
        }

        let shift = Shift {
            id: Shift::generate_id(),
            technician_id: request.technician_id,
            start_date: request.start_date,
            end_date: Shift::end_date_for(request.start_date),
            external_event_id: request.external_event_id,
        };

        info!(
            "Assigning shift {} to {} for {} - {}",
            shift.id, shift.technician_id, shift.start_date, shift.end_date
        );

        self.shifts.insert_with_credit(&shift).await?;
        Ok(shift)
    }

    /// Revoke a shift and debit the technician one pending day, floored at
    /// zero.
    pub async fn delete(&self, shift_id: &str) -> Result<(), LedgerError> {
        info!("Revoking shift {}", shift_id);
        self.shifts.delete_with_debit(shift_id).await
    }
}
