use shared::{Shift, ShiftWithTechnician, TechnicianRef};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::balance::BalanceOp;
use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;
use crate::storage::repositories::TechnicianRepository;

/// Repository for on-call shifts.
#[derive(Clone)]
pub struct ShiftRepository {
    db: DbConnection,
}

impl ShiftRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Insert a shift and credit the owning technician one pending day,
    /// atomically. An inactive technician cannot be assigned a shift.
    ///
    /// The transaction leads with the insert so its first statement takes a
    /// write lock; read-then-write transactions can deadlock under load.
    pub async fn insert_with_credit(&self, shift: &Shift) -> Result<(), LedgerError> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query(
            r#"
            INSERT INTO shifts (id, technician_id, start_date, end_date, external_event_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&shift.id)
        .bind(&shift.technician_id)
        .bind(shift.start_date)
        .bind(shift.end_date)
        .bind(&shift.external_event_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            LedgerError::from_insert(
                e,
                &format!(
                    "technician {} already has a shift starting {}",
                    shift.technician_id, shift.start_date
                ),
                &format!("technician not found: {}", shift.technician_id),
            )
        })?;

        let row = sqlx::query("SELECT active FROM technicians WHERE id = ?")
            .bind(&shift.technician_id)
            .fetch_one(&mut *tx)
            .await?;
        if !row.get::<bool, _>("active") {
            // Dropping the transaction rolls the insert back.
            return Err(LedgerError::InvalidArgument(format!(
                "technician {} is not active",
                shift.technician_id
            )));
        }

        TechnicianRepository::apply_balance(&mut tx, &shift.technician_id, BalanceOp::Credit)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a shift and debit the owning technician one pending day (floored
    /// at zero), atomically.
    pub async fn delete_with_debit(&self, shift_id: &str) -> Result<(), LedgerError> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query("DELETE FROM shifts WHERE id = ? RETURNING technician_id")
            .bind(shift_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(LedgerError::not_found("shift", shift_id));
        };
        let technician_id: String = row.get("technician_id");

        TechnicianRepository::apply_balance(&mut tx, &technician_id, BalanceOp::DebitFloored)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, shift_id: &str) -> Result<Option<Shift>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT id, technician_id, start_date, end_date, external_event_id
            FROM shifts
            WHERE id = ?
            "#,
        )
        .bind(shift_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| shift_from_row(&r)))
    }

    /// List all shifts joined to technician identity, ordered by start date.
    pub async fn list_with_technician(&self) -> Result<Vec<ShiftWithTechnician>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.technician_id, s.start_date, s.end_date, s.external_event_id,
                   t.name AS technician_name, t.email AS technician_email
            FROM shifts s
            JOIN technicians t ON t.id = s.technician_id
            ORDER BY s.start_date ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| ShiftWithTechnician {
                shift: shift_from_row(row),
                technician: TechnicianRef {
                    id: row.get("technician_id"),
                    name: row.get("technician_name"),
                    email: row.get("technician_email"),
                },
            })
            .collect())
    }
}

fn shift_from_row(row: &SqliteRow) -> Shift {
    Shift {
        id: row.get("id"),
        technician_id: row.get("technician_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        external_event_id: row.get("external_event_id"),
    }
}
