//! Storage abstraction traits.
//!
//! The domain layer depends on these instead of the concrete SQLite
//! repositories where it only needs a slice of the storage surface.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use shared::RestDay;

use crate::domain::errors::LedgerError;

/// The slice of rest-day storage the reconciliation sweep works against.
pub trait RestDaySource: Send + Sync {
    /// All rest days scheduled for `date`, processed or not.
    fn list_for_date(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<RestDay>, LedgerError>> + Send;

    /// Transition a rest day to processed, exactly once.
    ///
    /// Returns false when the row was already processed (or deleted in the
    /// meantime).
    fn mark_processed(
        &self,
        rest_day_id: &str,
        processed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;
}
