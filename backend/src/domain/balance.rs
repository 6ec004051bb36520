//! The balance engine: pure transitions over a technician's pending-days
//! counter.
//!
//! Every mutation of `pending_days` anywhere in the system corresponds to one
//! [`BalanceOp`]. The repositories execute the same transitions as single
//! conditional `UPDATE` statements so concurrent mutations serialize on the
//! database row; this module is the readable (and exhaustively tested)
//! statement of what those statements do.

use crate::domain::errors::LedgerError;

/// A mutation of a technician's pending-days balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOp {
    /// Assigning a shift, or revoking an unprocessed rest day: one day earned
    /// back.
    Credit,
    /// Revoking a shift: one day removed, floored at zero.
    DebitFloored,
    /// Taking a rest day: one day spent, rejected when the balance is empty.
    DebitChecked,
    /// Manual adjustment to an explicit value.
    Set(i64),
}

/// Compute the next pending-days value for `technician_id`.
pub fn apply(op: BalanceOp, current: i64, technician_id: &str) -> Result<i64, LedgerError> {
    match op {
        BalanceOp::Credit => Ok(current + 1),
        BalanceOp::DebitFloored => Ok((current - 1).max(0)),
        BalanceOp::DebitChecked => {
            if current <= 0 {
                Err(LedgerError::InsufficientBalance {
                    technician_id: technician_id.to_string(),
                })
            } else {
                Ok(current - 1)
            }
        }
        BalanceOp::Set(value) => {
            if value < 0 {
                Err(LedgerError::InvalidArgument(format!(
                    "pending_days must not be negative, got {}",
                    value
                )))
            } else {
                Ok(value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_increments() {
        assert_eq!(apply(BalanceOp::Credit, 0, "t").unwrap(), 1);
        assert_eq!(apply(BalanceOp::Credit, 4, "t").unwrap(), 5);
    }

    #[test]
    fn test_debit_floored_never_goes_negative() {
        assert_eq!(apply(BalanceOp::DebitFloored, 3, "t").unwrap(), 2);
        assert_eq!(apply(BalanceOp::DebitFloored, 1, "t").unwrap(), 0);
        assert_eq!(apply(BalanceOp::DebitFloored, 0, "t").unwrap(), 0);
    }

    #[test]
    fn test_debit_checked_spends_a_day() {
        assert_eq!(apply(BalanceOp::DebitChecked, 2, "t").unwrap(), 1);
        assert_eq!(apply(BalanceOp::DebitChecked, 1, "t").unwrap(), 0);
    }

    #[test]
    fn test_debit_checked_rejects_empty_balance() {
        let err = apply(BalanceOp::DebitChecked, 0, "technician::abc").unwrap_err();
        match err {
            LedgerError::InsufficientBalance { technician_id } => {
                assert_eq!(technician_id, "technician::abc");
            }
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }
    }

    #[test]
    fn test_set_accepts_zero_and_positive() {
        assert_eq!(apply(BalanceOp::Set(0), 7, "t").unwrap(), 0);
        assert_eq!(apply(BalanceOp::Set(12), 0, "t").unwrap(), 12);
    }

    #[test]
    fn test_set_rejects_negative() {
        let err = apply(BalanceOp::Set(-1), 5, "t").unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn test_credit_then_debit_round_trips() {
        // Assigning then revoking a shift restores the prior balance.
        for start in 0..5 {
            let after_assign = apply(BalanceOp::Credit, start, "t").unwrap();
            let after_revoke = apply(BalanceOp::DebitFloored, after_assign, "t").unwrap();
            assert_eq!(after_revoke, start);
        }
    }
}
