use super::account::{AccountId, Balance};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Shared handle to a ledger store backend.
pub type LedgerStoreArc = Arc<dyn LedgerStore>;

/// Durable storage of balance records with an isolated unit-of-work primitive.
///
/// The store exclusively owns all balance records; every mutation passes
/// through a [`LedgerUnit`] and becomes visible only at commit.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Side-effect-free read of one balance record.
    async fn balance(&self, account: &AccountId) -> Result<Option<Balance>>;

    /// Creates the one balance record for `account`. Fails with
    /// [`LedgerError::AccountExists`](crate::error::LedgerError::AccountExists)
    /// if the record already exists.
    async fn create_account(&self, account: AccountId, initial: Balance) -> Result<()>;

    /// Snapshot of every balance record.
    async fn all_balances(&self) -> Result<Vec<(AccountId, Balance)>>;

    /// Opens an isolated unit of work.
    async fn begin(&self) -> Result<Box<dyn LedgerUnit>>;
}

/// One isolated, atomic scope of reads and queued writes.
///
/// A unit guarantees that no other unit can commit a mutation to a record it
/// has read via [`read_for_update`](LedgerUnit::read_for_update) between that
/// read and this unit's commit or abort. Implementations may realize this
/// optimistically: a conflicting commit elsewhere makes this unit's commit
/// fail with `CommitConflict` instead of blocking it.
#[async_trait]
pub trait LedgerUnit: Send {
    /// Reads a balance within the unit and registers intent to mutate it.
    async fn read_for_update(&mut self, account: &AccountId) -> Result<Option<Balance>>;

    /// Queues a signed balance adjustment, applied atomically at commit.
    fn apply_delta(&mut self, account: &AccountId, delta: Decimal);

    /// Makes all queued deltas visible atomically. Fails with `CommitConflict`
    /// when another unit committed to a read record first, when a record
    /// vanished, or when a delta would drive a balance negative.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards all queued deltas. Nothing becomes visible.
    async fn abort(self: Box<Self>);
}
