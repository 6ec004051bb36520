use shared::{CreateRestDayRequest, RestDay, RestDayWithTechnician};
use tracing::info;

use crate::domain::balance::{self, BalanceOp};
use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;
use crate::storage::repositories::{RestDayRepository, TechnicianRepository};

/// Service for taking and revoking compensatory rest days.
#[derive(Clone)]
pub struct RestDayService {
    rest_days: RestDayRepository,
    technicians: TechnicianRepository,
}

impl RestDayService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            rest_days: RestDayRepository::new(db.clone()),
            technicians: TechnicianRepository::new(db),
        }
    }

    /// List all rest days joined to their technician, ordered by date.
    pub async fn list(&self) -> Result<Vec<RestDayWithTechnician>, LedgerError> {
        let rest_days = self.rest_days.list_with_technician().await?;
        info!("Found {} rest days", rest_days.len());
        Ok(rest_days)
    }

    /// Take one rest day against the technician's balance.
    ///
    /// The engine check here fails fast with a precise error; the storage
    /// layer re-enforces the same precondition inside the transaction, so a
    /// concurrent request that empties the balance in between still cannot
    /// overdraw it.
    pub async fn create(&self, request: CreateRestDayRequest) -> Result<RestDay, LedgerError> {
        if request.technician_id.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(
                "technician_id is required".to_string(),
            ));
        }

        let technician = self
            .technicians
            .get(&request.technician_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("technician", &request.technician_id))?;
        balance::apply(
            BalanceOp::DebitChecked,
            technician.pending_days,
            &technician.id,
        )?;

        let rest_day = RestDay {
            id: RestDay::generate_id(),
            technician_id: request.technician_id,
            date: request.date,
            processed: false,
            processed_at: None,
            external_event_id: request.external_event_id,
        };

        info!(
            "Assigning rest day {} to {} on {}",
            rest_day.id, rest_day.technician_id, rest_day.date
        );

        self.rest_days.insert_with_debit(&rest_day).await?;
        Ok(rest_day)
    }

    /// Revoke an unprocessed rest day and credit the day back.
    pub async fn delete(&self, rest_day_id: &str) -> Result<(), LedgerError> {
        info!("Revoking rest day {}", rest_day_id);
        self.rest_days.delete_with_credit(rest_day_id).await
    }
}
