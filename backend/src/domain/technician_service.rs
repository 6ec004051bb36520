use shared::Technician;
use tracing::{info, warn};

use crate::domain::balance::{self, BalanceOp};
use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;
use crate::storage::repositories::TechnicianRepository;

/// Service for technician listings and manual balance adjustments.
#[derive(Clone)]
pub struct TechnicianService {
    technicians: TechnicianRepository,
}

impl TechnicianService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            technicians: TechnicianRepository::new(db),
        }
    }

    /// List all technicians ordered by name.
    pub async fn list(&self) -> Result<Vec<Technician>, LedgerError> {
        let technicians = self.technicians.list().await?;
        info!("Found {} technicians", technicians.len());
        Ok(technicians)
    }

    /// Manually overwrite a technician's pending-days balance.
    ///
    /// The only path that sets the balance to an explicit value; everything
    /// else goes through the incremental balance operations.
    pub async fn set_pending_days(
        &self,
        technician_id: &str,
        pending_days: Option<i64>,
    ) -> Result<Technician, LedgerError> {
        let Some(value) = pending_days else {
            return Err(LedgerError::InvalidArgument(
                "pending_days is required".to_string(),
            ));
        };

        info!("Setting pending days for {} to {}", technician_id, value);

        let current = self
            .technicians
            .get(technician_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("technician", technician_id))?
            .pending_days;

        let next = balance::apply(BalanceOp::Set(value), current, technician_id)?;
        let updated = self.technicians.set_pending_days(technician_id, next).await?;

        if current != next {
            info!(
                "Adjusted pending days for {}: {} -> {}",
                technician_id, current, next
            );
        } else {
            warn!("Manual adjustment for {} left the balance at {}", technician_id, next);
        }

        Ok(updated)
    }
}
