//! Business logic for the on-call ledger.
//!
//! Services validate requests, drive the balance engine, and delegate the
//! transactional work to the storage layer. No HTTP detail lives here.

pub mod balance;
pub mod errors;
pub mod reconciliation;
pub mod rest_day_service;
pub mod shift_service;
pub mod technician_service;

pub use errors::LedgerError;
pub use reconciliation::ReconciliationJob;
pub use rest_day_service::RestDayService;
pub use shift_service::ShiftService;
pub use technician_service::TechnicianService;
