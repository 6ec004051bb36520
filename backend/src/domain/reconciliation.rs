//! Daily reconciliation sweep over rest days.
//!
//! Finalizes every rest day scheduled for the current date by transitioning it
//! `Scheduled -> Processed`, exactly once. The balance was already charged
//! when the rest day was created, so the sweep is purely a bookkeeping
//! transition; re-running it on the same day is a no-op.
//!
//! The sweep runs once at process start and whenever an operator triggers it
//! over HTTP; there is no internal timer.

use chrono::{NaiveDate, Utc};
use shared::ReconciliationOutcome;
use tracing::{error, info};

use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;
use crate::storage::repositories::RestDayRepository;
use crate::storage::traits::RestDaySource;

/// Idempotent sweep that marks today's rest days as processed.
///
/// Generic over the rest-day source so the sweep can run against any
/// [`RestDaySource`]; production uses the SQLite repository.
#[derive(Clone)]
pub struct ReconciliationJob<S = RestDayRepository> {
    rest_days: S,
}

impl ReconciliationJob {
    pub fn new(db: DbConnection) -> Self {
        Self {
            rest_days: RestDayRepository::new(db),
        }
    }
}

impl<S: RestDaySource> ReconciliationJob<S> {
    /// Run the sweep for the current UTC date.
    pub async fn run_today(&self) -> Result<ReconciliationOutcome, LedgerError> {
        self.run_for_date(Utc::now().date_naive()).await
    }

    /// Run the sweep for an explicit date.
    ///
    /// Failure policy: every row is attempted; a per-row failure is logged and
    /// never blocks the remaining rows. If any row failed, the first failure
    /// is propagated after the pass, carrying the count of rows that did go
    /// through.
    pub async fn run_for_date(&self, date: NaiveDate) -> Result<ReconciliationOutcome, LedgerError> {
        info!("Reconciling rest days for {}", date);

        let due = self.rest_days.list_for_date(date).await?;
        if due.is_empty() {
            info!("No rest days to reconcile for {}", date);
            return Ok(ReconciliationOutcome {
                date,
                processed: 0,
                skipped: 0,
            });
        }

        let mut processed = 0u64;
        let mut skipped = 0u64;
        let mut first_failure: Option<LedgerError> = None;

        for rest_day in due {
            if rest_day.processed {
                skipped += 1;
                continue;
            }
            match self.rest_days.mark_processed(&rest_day.id, Utc::now()).await {
                // false: processed (or deleted) by a concurrent run since the
                // select above.
                Ok(true) => processed += 1,
                Ok(false) => skipped += 1,
                Err(e) => {
                    error!("Failed to mark rest day {} as processed: {}", rest_day.id, e);
                    if first_failure.is_none() {
                        first_failure = Some(e);
                    }
                }
            }
        }

        if let Some(source) = first_failure {
            return Err(LedgerError::ReconciliationIncomplete {
                processed,
                source: Box::new(source),
            });
        }

        info!(
            "Reconciled {} rest days for {} ({} already processed)",
            processed, date, skipped
        );
        Ok(ReconciliationOutcome {
            date,
            processed,
            skipped,
        })
    }
}
