use thiserror::Error;

/// Typed errors surfaced by the balance engine and the ledger store.
///
/// The REST layer owns the translation to HTTP status codes; nothing below it
/// should ever format a status code or leak raw storage detail to a caller.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("technician {technician_id} has no pending days available")]
    InsufficientBalance { technician_id: String },

    #[error("{0}")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// The reconciliation sweep hit a hard per-row failure. All remaining rows
    /// were still attempted; `processed` counts the rows that went through.
    #[error("reconciliation incomplete, {processed} rest days processed: {source}")]
    ReconciliationIncomplete {
        processed: u64,
        #[source]
        source: Box<LedgerError>,
    },
}

impl LedgerError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound(format!("{} not found: {}", entity, id))
    }

    /// Classify a storage error raised while inserting a shift or rest day.
    ///
    /// The schema enforces the ledger invariants independently of the engine's
    /// own checks, so constraint violations are mapped back onto the same
    /// error kinds the engine would have produced.
    pub fn from_insert(err: sqlx::Error, duplicate: &str, missing: &str) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            if db.is_unique_violation() {
                return Self::Conflict(duplicate.to_string());
            }
            if db.is_foreign_key_violation() {
                return Self::NotFound(missing.to_string());
            }
        }
        Self::Storage(err)
    }
}
