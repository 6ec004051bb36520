use shared::Technician;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use crate::domain::balance::BalanceOp;
use crate::domain::errors::LedgerError;
use crate::storage::db::DbConnection;

/// Repository for technician records and their pending-days balance.
#[derive(Clone)]
pub struct TechnicianRepository {
    db: DbConnection,
}

impl TechnicianRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Store a technician. Technicians are seeded out-of-band; there is no
    /// HTTP route for this.
    pub async fn insert(&self, technician: &Technician) -> Result<(), LedgerError> {
        sqlx::query(
            r#"
            INSERT INTO technicians (id, name, email, pending_days, active)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&technician.id)
        .bind(&technician.name)
        .bind(&technician.email)
        .bind(technician.pending_days)
        .bind(technician.active)
        .execute(self.db.pool())
        .await
        .map_err(|e| {
            LedgerError::from_insert(
                e,
                "technician name or email already in use",
                "technician not found",
            )
        })?;
        Ok(())
    }

    pub async fn get(&self, technician_id: &str) -> Result<Option<Technician>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, pending_days, active
            FROM technicians
            WHERE id = ?
            "#,
        )
        .bind(technician_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|r| technician_from_row(&r)))
    }

    /// List all technicians ordered by name.
    pub async fn list(&self) -> Result<Vec<Technician>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, pending_days, active
            FROM technicians
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(technician_from_row).collect())
    }

    /// Overwrite the pending-days balance with an engine-validated value and
    /// return the updated record. Goes through the same transactional
    /// primitive as every other balance write.
    pub async fn set_pending_days(
        &self,
        technician_id: &str,
        pending_days: i64,
    ) -> Result<Technician, LedgerError> {
        let mut tx = self.db.pool().begin().await?;
        Self::apply_balance(&mut tx, technician_id, BalanceOp::Set(pending_days)).await?;
        tx.commit().await?;

        self.get(technician_id)
            .await?
            .ok_or_else(|| LedgerError::not_found("technician", technician_id))
    }

    pub async fn set_active(&self, technician_id: &str, active: bool) -> Result<(), LedgerError> {
        let result = sqlx::query("UPDATE technicians SET active = ? WHERE id = ?")
            .bind(active)
            .bind(technician_id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("technician", technician_id));
        }
        Ok(())
    }

    /// Apply one balance transition inside the caller's transaction.
    ///
    /// Each transition is a single conditional `UPDATE` computed from the
    /// stored value, so concurrent mutations on the same technician serialize
    /// on the row and can never lose updates. The affected-row count is
    /// interpreted back into the engine's error kinds.
    pub(crate) async fn apply_balance(
        tx: &mut Transaction<'_, Sqlite>,
        technician_id: &str,
        op: BalanceOp,
    ) -> Result<(), LedgerError> {
        let result = match op {
            BalanceOp::Credit => {
                sqlx::query("UPDATE technicians SET pending_days = pending_days + 1 WHERE id = ?")
                    .bind(technician_id)
                    .execute(&mut **tx)
                    .await
            }
            BalanceOp::DebitFloored => sqlx::query(
                "UPDATE technicians SET pending_days = MAX(pending_days - 1, 0) WHERE id = ?",
            )
            .bind(technician_id)
            .execute(&mut **tx)
            .await,
            BalanceOp::DebitChecked => sqlx::query(
                "UPDATE technicians SET pending_days = pending_days - 1 \
                 WHERE id = ? AND pending_days > 0",
            )
            .bind(technician_id)
            .execute(&mut **tx)
            .await,
            BalanceOp::Set(value) => {
                sqlx::query("UPDATE technicians SET pending_days = ? WHERE id = ?")
                    .bind(value)
                    .bind(technician_id)
                    .execute(&mut **tx)
                    .await
            }
        }
        .map_err(map_balance_error)?;

        if result.rows_affected() == 0 {
            if op == BalanceOp::DebitChecked {
                let exists = sqlx::query("SELECT 1 FROM technicians WHERE id = ?")
                    .bind(technician_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .is_some();
                if exists {
                    return Err(LedgerError::InsufficientBalance {
                        technician_id: technician_id.to_string(),
                    });
                }
            }
            return Err(LedgerError::not_found("technician", technician_id));
        }

        Ok(())
    }
}

fn technician_from_row(row: &SqliteRow) -> Technician {
    Technician {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        pending_days: row.get("pending_days"),
        active: row.get("active"),
    }
}

fn map_balance_error(err: sqlx::Error) -> LedgerError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_check_violation() {
            return LedgerError::InvalidArgument(
                "pending_days must not be negative".to_string(),
            );
        }
    }
    LedgerError::Storage(err)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn technician(name: &str) -> Technician {
        Technician {
            id: Technician::generate_id(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            pending_days: 0,
            active: true,
        }
    }

    async fn setup_test() -> TechnicianRepository {
        let db = DbConnection::init_test().await.expect("test db");
        TechnicianRepository::new(db)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = setup_test().await;
        let tech = technician("Ana");

        repo.insert(&tech).await.expect("insert");

        let found = repo.get(&tech.id).await.expect("get").expect("present");
        assert_eq!(found, tech);
    }

    #[tokio::test]
    async fn test_insert_duplicate_name_is_conflict() {
        let repo = setup_test().await;
        let mut a = technician("Ana");
        repo.insert(&a).await.expect("insert");

        a.id = Technician::generate_id();
        a.email = "other@example.com".to_string();
        let err = repo.insert(&a).await.unwrap_err();
        assert!(matches!(err, LedgerError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let repo = setup_test().await;
        repo.insert(&technician("Carlos")).await.expect("insert");
        repo.insert(&technician("Ana")).await.expect("insert");
        repo.insert(&technician("Berta")).await.expect("insert");

        let all = repo.list().await.expect("list");
        let names: Vec<&str> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Berta", "Carlos"]);
    }

    #[tokio::test]
    async fn test_set_pending_days_overwrites_balance() {
        let repo = setup_test().await;
        let mut tech = technician("Ana");
        tech.pending_days = 2;
        repo.insert(&tech).await.expect("insert");

        let updated = repo.set_pending_days(&tech.id, 7).await.expect("set");
        assert_eq!(updated.pending_days, 7);
    }

    #[tokio::test]
    async fn test_apply_balance_set_negative_hits_schema_check() {
        let repo = setup_test().await;
        let tech = technician("Ana");
        repo.insert(&tech).await.expect("insert");

        // The engine rejects negatives before storage is reached; the CHECK
        // constraint covers any path that bypasses it.
        let mut tx = repo.db.pool().begin().await.expect("begin");
        let err = TechnicianRepository::apply_balance(&mut tx, &tech.id, BalanceOp::Set(-1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_set_pending_days_missing_technician() {
        let repo = setup_test().await;
        let err = repo.set_pending_days("technician::missing", 3).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_apply_balance_credit_and_floored_debit() {
        let repo = setup_test().await;
        let tech = technician("Ana");
        repo.insert(&tech).await.expect("insert");

        for op in [BalanceOp::Credit, BalanceOp::Credit, BalanceOp::DebitFloored] {
            let mut tx = repo.db.pool().begin().await.expect("begin");
            TechnicianRepository::apply_balance(&mut tx, &tech.id, op)
                .await
                .expect("apply");
            tx.commit().await.expect("commit");
        }

        let found = repo.get(&tech.id).await.expect("get").expect("present");
        assert_eq!(found.pending_days, 1);
    }

    #[tokio::test]
    async fn test_apply_balance_floored_debit_stops_at_zero() {
        let repo = setup_test().await;
        let tech = technician("Ana");
        repo.insert(&tech).await.expect("insert");

        let mut tx = repo.db.pool().begin().await.expect("begin");
        TechnicianRepository::apply_balance(&mut tx, &tech.id, BalanceOp::DebitFloored)
            .await
            .expect("apply");
        tx.commit().await.expect("commit");

        let found = repo.get(&tech.id).await.expect("get").expect("present");
        assert_eq!(found.pending_days, 0);
    }

    #[tokio::test]
    async fn test_apply_balance_checked_debit_on_empty_balance() {
        let repo = setup_test().await;
        let tech = technician("Ana");
        repo.insert(&tech).await.expect("insert");

        let mut tx = repo.db.pool().begin().await.expect("begin");
        let err = TechnicianRepository::apply_balance(&mut tx, &tech.id, BalanceOp::DebitChecked)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    }

    #[tokio::test]
    async fn test_apply_balance_missing_technician() {
        let repo = setup_test().await;

        let mut tx = repo.db.pool().begin().await.expect("begin");
        let err = TechnicianRepository::apply_balance(
            &mut tx,
            "technician::missing",
            BalanceOp::Credit,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }
}
