use crate::domain::account::AccountId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Every failure the ledger core can signal to its caller.
///
/// All variants except `StoreUnavailable` are expected, non-fatal conditions;
/// the request-handling layer maps them to transport responses.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Transfer amount was zero, negative, or otherwise not a positive decimal.
    #[error("amount must be a positive decimal")]
    InvalidAmount,

    /// Initial balance for a new account was negative.
    #[error("initial balance must not be negative")]
    InvalidInitialBalance,

    /// Source and destination refer to the same account.
    #[error("source and destination are the same account")]
    SelfTransfer,

    /// The source account has no balance record.
    #[error("source account not found")]
    SourceNotFound,

    /// The destination account has no balance record.
    #[error("destination account not found")]
    DestinationNotFound,

    /// Source balance is less than the requested amount.
    #[error("insufficient funds in source account")]
    InsufficientFunds,

    /// A balance record already exists for this account.
    #[error("account {0} already has a balance record")]
    AccountExists(AccountId),

    /// A unit of work lost a commit race against another unit. Retryable:
    /// callers restart the whole unit rather than surfacing this.
    #[error("unit of work lost a commit race")]
    CommitConflict,

    /// The retry budget was exhausted under contention. The caller may
    /// resubmit the transfer.
    #[error("transfer did not commit after {attempts} attempts")]
    TransferConflict { attempts: u32 },

    /// The storage backend could not be reached or failed internally.
    #[error("ledger storage unavailable")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LedgerError {
    /// True for conditions that are resolved by restarting the unit of work.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::CommitConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_commit_conflict_is_retryable() {
        assert!(LedgerError::CommitConflict.is_retryable());
        assert!(!LedgerError::InsufficientFunds.is_retryable());
        assert!(!LedgerError::TransferConflict { attempts: 5 }.is_retryable());
    }
}
