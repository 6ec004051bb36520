use chrono::{DateTime, NaiveDate, Utc};
use shared::{RestDay, RestDayWithTechnician, TechnicianRef};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::balance::BalanceOp;
use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;
use crate::storage::repositories::TechnicianRepository;
use crate::storage::traits::RestDaySource;

/// Repository for compensatory rest days.
#[derive(Clone)]
pub struct RestDayRepository {
    db: DbConnection,
}

impl RestDayRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a rest day and debit the owning technician one pending day,
    /// atomically. The conditional balance update inside the transaction
    /// re-enforces the engine's insufficient-balance check, so a concurrent
    /// request can never drive the balance below zero.
    pub async fn insert_with_debit(&self, rest_day: &RestDay) -> Result<(), LedgerError> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rest_days (id, technician_id, date, processed, processed_at, external_event_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&rest_day.id)
        .bind(&rest_day.technician_id)
        .bind(rest_day.date)
        .bind(rest_day.processed)
        .bind(rest_day.processed_at)
        .bind(&rest_day.external_event_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            LedgerError::from_insert(
                e,
                &format!(
                    "technician {} already has a rest day on {}",
                    rest_day.technician_id, rest_day.date
                ),
                &format!("technician not found: {}", rest_day.technician_id),
            )
        })?;

        TechnicianRepository::apply_balance(
            &mut tx,
            &rest_day.technician_id,
            BalanceOp::DebitChecked,
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete an unprocessed rest day and credit the day back, atomically.
    ///
    /// A processed rest day has already been taken; deleting it would mint a
    /// free day, so it is rejected with a conflict.
    pub async fn delete_with_credit(&self, rest_day_id: &str) -> Result<(), LedgerError> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "DELETE FROM rest_days WHERE id = ? AND processed = 0 RETURNING technician_id",
        )
        .bind(rest_day_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            let still_there = sqlx::query("SELECT 1 FROM rest_days WHERE id = ?")
                .bind(rest_day_id)
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            return Err(if still_there {
                LedgerError::Conflict(format!(
                    "rest day {} is already processed and can no longer be revoked",
                    rest_day_id
                ))
            } else {
                LedgerError::not_found("rest day", rest_day_id)
            });
        };
        let technician_id: String = row.get("technician_id");

        TechnicianRepository::apply_balance(&mut tx, &technician_id, BalanceOp::Credit).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, rest_day_id: &str) -> Result<Option<RestDay>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT id, technician_id, date, processed, processed_at, external_event_id
            FROM rest_days
            WHERE id = ?
            "#,
        )
        .bind(rest_day_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| rest_day_from_row(&r)))
    }

    /// List all rest days joined to technician identity, ordered by date.
    pub async fn list_with_technician(&self) -> Result<Vec<RestDayWithTechnician>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.technician_id, r.date, r.processed, r.processed_at, r.external_event_id,
                   t.name AS technician_name, t.email AS technician_email
            FROM rest_days r
            JOIN technicians t ON t.id = r.technician_id
            ORDER BY r.date ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| RestDayWithTechnician {
                rest_day: rest_day_from_row(row),
                technician: TechnicianRef {
                    id: row.get("technician_id"),
                    name: row.get("technician_name"),
                    email: row.get("technician_email"),
                },
            })
            .collect())
    }

    /// All rest days scheduled for `date`, processed or not.
    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<RestDay>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT id, technician_id, date, processed, processed_at, external_event_id
            FROM rest_days
            WHERE date = ?
            "#,
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(rest_day_from_row).collect())
    }

    /// Transition a rest day to processed, exactly once.
    ///
    /// Returns false when the row was already processed (or deleted in the
    /// meantime); the conditional update is what makes the reconciliation
    /// sweep idempotent under concurrent runs.
    pub async fn mark_processed(
        &self,
        rest_day_id: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        let result = sqlx::query(
            "UPDATE rest_days SET processed = 1, processed_at = ? WHERE id = ? AND processed = 0",
        )
        .bind(processed_at)
        .bind(rest_day_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl RestDaySource for RestDayRepository {
    async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<RestDay>, LedgerError> {
        RestDayRepository::list_for_date(self, date).await
    }

    async fn mark_processed(
        &self,
        rest_day_id: &str,
        processed_at: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        RestDayRepository::mark_processed(self, rest_day_id, processed_at).await
    }
}

fn rest_day_from_row(row: &SqliteRow) -> RestDay {
    RestDay {
        id: row.get("id"),
        technician_id: row.get("technician_id"),
        date: row.get("date"),
        processed: row.get("processed"),
        processed_at: row.get("processed_at"),
        external_event_id: row.get("external_event_id"),
    }
}
