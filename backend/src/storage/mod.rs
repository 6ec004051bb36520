//! Durable storage for the ledger.
//!
//! The schema enforces the ledger invariants (uniqueness, foreign keys,
//! non-negative balance) independently of the balance engine's own checks, and
//! the repositories expose the transactional primitives that pair one record
//! write with one balance write.

pub mod db;
pub mod repositories;
pub mod traits;
