use crate::domain::account::{AccountId, Balance};
use crate::domain::ports::{LedgerStore, LedgerUnit};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Per-record state: the balance plus a version counter bumped on every
/// committed mutation. Units validate read versions at commit.
#[derive(Debug, Clone)]
struct Record {
    balance: Decimal,
    version: u64,
}

/// A thread-safe in-memory ledger store.
///
/// Uses `Arc<RwLock<HashMap<AccountId, Record>>>` for shared concurrent
/// access, with optimistic concurrency control: a unit of work remembers the
/// version of every record it read for update, and commit fails with
/// `CommitConflict` if any of those versions moved in the meantime. The whole
/// commit runs under the write lock, so queued deltas become visible
/// atomically.
#[derive(Default, Clone)]
pub struct InMemoryLedger {
    accounts: Arc<RwLock<HashMap<AccountId, Record>>>,
}

impl InMemoryLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn balance(&self, account: &AccountId) -> Result<Option<Balance>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(account).map(|r| Balance::new(r.balance)))
    }

    async fn create_account(&self, account: AccountId, initial: Balance) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&account) {
            return Err(LedgerError::AccountExists(account));
        }
        accounts.insert(
            account,
            Record {
                balance: initial.value(),
                version: 0,
            },
        );
        Ok(())
    }

    async fn all_balances(&self) -> Result<Vec<(AccountId, Balance)>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .map(|(id, r)| (id.clone(), Balance::new(r.balance)))
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn LedgerUnit>> {
        Ok(Box::new(InMemoryUnit {
            accounts: Arc::clone(&self.accounts),
            reads: HashMap::new(),
            deltas: HashMap::new(),
        }))
    }
}

/// One unit of work over an [`InMemoryLedger`].
///
/// Reads and deltas are buffered locally; nothing touches the shared map
/// until commit, so dropping the unit (cancellation) or aborting it leaves
/// no trace.
struct InMemoryUnit {
    accounts: Arc<RwLock<HashMap<AccountId, Record>>>,
    reads: HashMap<AccountId, u64>,
    deltas: HashMap<AccountId, Decimal>,
}

#[async_trait]
impl LedgerUnit for InMemoryUnit {
    async fn read_for_update(&mut self, account: &AccountId) -> Result<Option<Balance>> {
        let accounts = self.accounts.read().await;
        match accounts.get(account) {
            Some(record) => {
                self.reads.insert(account.clone(), record.version);
                Ok(Some(Balance::new(record.balance)))
            }
            None => Ok(None),
        }
    }

    fn apply_delta(&mut self, account: &AccountId, delta: Decimal) {
        *self.deltas.entry(account.clone()).or_insert(Decimal::ZERO) += delta;
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut accounts = self.accounts.write().await;

        // Validate every read under the write lock: any version that moved
        // means another unit committed first.
        for (id, version) in &self.reads {
            match accounts.get(id) {
                Some(record) if record.version == *version => {}
                _ => return Err(LedgerError::CommitConflict),
            }
        }

        // Constraint check before mutating anything, so a failed commit
        // leaves no partial state.
        for (id, delta) in &self.deltas {
            match accounts.get(id) {
                Some(record) if record.balance + *delta >= Decimal::ZERO => {}
                _ => return Err(LedgerError::CommitConflict),
            }
        }

        for (id, delta) in &self.deltas {
            // Presence was validated above, under the same write lock.
            if let Some(record) = accounts.get_mut(id) {
                record.balance += *delta;
                record.version += 1;
            }
        }

        Ok(())
    }

    async fn abort(self: Box<Self>) {
        // Deltas were never applied to the shared map; dropping is enough.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_and_read() {
        let store = InMemoryLedger::new();
        store
            .create_account("alice".into(), Balance::new(dec!(100.0)))
            .await
            .unwrap();

        let balance = store.balance(&"alice".into()).await.unwrap();
        assert_eq!(balance, Some(Balance::new(dec!(100.0))));

        assert!(store.balance(&"bob".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_rejected() {
        let store = InMemoryLedger::new();
        store
            .create_account("alice".into(), Balance::ZERO)
            .await
            .unwrap();

        let result = store.create_account("alice".into(), Balance::ZERO).await;
        assert!(matches!(result, Err(LedgerError::AccountExists(_))));
    }

    #[tokio::test]
    async fn test_unit_commit_applies_deltas_atomically() {
        let store = InMemoryLedger::new();
        store
            .create_account("alice".into(), Balance::new(dec!(100.0)))
            .await
            .unwrap();
        store
            .create_account("bob".into(), Balance::new(dec!(50.0)))
            .await
            .unwrap();

        let mut unit = store.begin().await.unwrap();
        unit.read_for_update(&"alice".into()).await.unwrap();
        unit.read_for_update(&"bob".into()).await.unwrap();
        unit.apply_delta(&"alice".into(), dec!(-40.0));
        unit.apply_delta(&"bob".into(), dec!(40.0));

        // Nothing visible before commit
        assert_eq!(
            store.balance(&"alice".into()).await.unwrap(),
            Some(Balance::new(dec!(100.0)))
        );

        unit.commit().await.unwrap();

        assert_eq!(
            store.balance(&"alice".into()).await.unwrap(),
            Some(Balance::new(dec!(60.0)))
        );
        assert_eq!(
            store.balance(&"bob".into()).await.unwrap(),
            Some(Balance::new(dec!(90.0)))
        );
    }

    #[tokio::test]
    async fn test_unit_abort_discards_deltas() {
        let store = InMemoryLedger::new();
        store
            .create_account("alice".into(), Balance::new(dec!(100.0)))
            .await
            .unwrap();

        let mut unit = store.begin().await.unwrap();
        unit.read_for_update(&"alice".into()).await.unwrap();
        unit.apply_delta(&"alice".into(), dec!(-40.0));
        unit.abort().await;

        assert_eq!(
            store.balance(&"alice".into()).await.unwrap(),
            Some(Balance::new(dec!(100.0)))
        );
    }

    #[tokio::test]
    async fn test_second_commit_to_same_record_conflicts() {
        let store = InMemoryLedger::new();
        store
            .create_account("alice".into(), Balance::new(dec!(100.0)))
            .await
            .unwrap();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first.read_for_update(&"alice".into()).await.unwrap();
        second.read_for_update(&"alice".into()).await.unwrap();

        first.apply_delta(&"alice".into(), dec!(-10.0));
        first.commit().await.unwrap();

        second.apply_delta(&"alice".into(), dec!(-10.0));
        let result = second.commit().await;
        assert!(matches!(result, Err(LedgerError::CommitConflict)));

        // Only the first unit's effect is visible.
        assert_eq!(
            store.balance(&"alice".into()).await.unwrap(),
            Some(Balance::new(dec!(90.0)))
        );
    }

    #[tokio::test]
    async fn test_commit_rejects_negative_result() {
        let store = InMemoryLedger::new();
        store
            .create_account("alice".into(), Balance::new(dec!(10.0)))
            .await
            .unwrap();

        let mut unit = store.begin().await.unwrap();
        unit.read_for_update(&"alice".into()).await.unwrap();
        unit.apply_delta(&"alice".into(), dec!(-20.0));

        assert!(matches!(
            unit.commit().await,
            Err(LedgerError::CommitConflict)
        ));
        assert_eq!(
            store.balance(&"alice".into()).await.unwrap(),
            Some(Balance::new(dec!(10.0)))
        );
    }
}
