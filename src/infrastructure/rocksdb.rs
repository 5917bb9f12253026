use crate::domain::account::{AccountId, Balance};
use crate::domain::ports::{LedgerStore, LedgerUnit};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing balance records.
pub const CF_BALANCES: &str = "balances";

/// A persistent ledger store backed by RocksDB.
///
/// Balance records live in a dedicated column family as JSON-encoded decimals.
/// Units of work are validated optimistically: `read_for_update` snapshots the
/// raw value of each record, and commit re-reads and compares those snapshots
/// under a process-wide commit mutex before applying all deltas in a single
/// `WriteBatch`. A mismatch fails the unit with `CommitConflict`.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbLedger {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDbLedger {
    /// Opens or creates a RocksDB instance at the specified path, ensuring the
    /// "balances" column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_balances = ColumnFamilyDescriptor::new(CF_BALANCES, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_balances])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_BALANCES).ok_or_else(|| {
            LedgerError::StoreUnavailable(Box::new(std::io::Error::other(
                "balances column family not found",
            )))
        })
    }

    fn decode(bytes: &[u8]) -> Result<Decimal> {
        serde_json::from_slice(bytes).map_err(|e| LedgerError::StoreUnavailable(Box::new(e)))
    }

    fn encode(balance: Decimal) -> Result<Vec<u8>> {
        serde_json::to_vec(&balance).map_err(|e| LedgerError::StoreUnavailable(Box::new(e)))
    }
}

impl From<rocksdb::Error> for LedgerError {
    fn from(e: rocksdb::Error) -> Self {
        LedgerError::StoreUnavailable(Box::new(e))
    }
}

#[async_trait]
impl LedgerStore for RocksDbLedger {
    async fn balance(&self, account: &AccountId) -> Result<Option<Balance>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, account.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(Balance::new(Self::decode(&bytes)?))),
            None => Ok(None),
        }
    }

    async fn create_account(&self, account: AccountId, initial: Balance) -> Result<()> {
        // The commit mutex also serializes record creation, so a concurrent
        // duplicate create cannot slip between the existence check and the put.
        let _guard = self.commit_lock.lock().await;
        let cf = self.cf()?;
        let key = account.as_str().as_bytes().to_vec();
        if self.db.get_pinned_cf(cf, &key)?.is_some() {
            return Err(LedgerError::AccountExists(account));
        }
        self.db.put_cf(cf, key, Self::encode(initial.value())?)?;
        Ok(())
    }

    async fn all_balances(&self) -> Result<Vec<(AccountId, Balance)>> {
        let cf = self.cf()?;
        let mut balances = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (key, value) = item?;
            let id = String::from_utf8(key.to_vec()).map_err(|e| {
                LedgerError::StoreUnavailable(Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("non-utf8 account key: {}", e),
                )))
            })?;
            balances.push((AccountId::from(id), Balance::new(Self::decode(&value)?)));
        }
        Ok(balances)
    }

    async fn begin(&self) -> Result<Box<dyn LedgerUnit>> {
        Ok(Box::new(RocksDbUnit {
            store: self.clone(),
            reads: HashMap::new(),
            deltas: HashMap::new(),
        }))
    }
}

/// One unit of work over a [`RocksDbLedger`].
struct RocksDbUnit {
    store: RocksDbLedger,
    /// Raw value snapshot of each record read for update.
    reads: HashMap<AccountId, Vec<u8>>,
    deltas: HashMap<AccountId, Decimal>,
}

#[async_trait]
impl LedgerUnit for RocksDbUnit {
    async fn read_for_update(&mut self, account: &AccountId) -> Result<Option<Balance>> {
        let cf = self.store.cf()?;
        match self.store.db.get_cf(cf, account.as_str().as_bytes())? {
            Some(bytes) => {
                let balance = RocksDbLedger::decode(&bytes)?;
                self.reads.insert(account.clone(), bytes);
                Ok(Some(Balance::new(balance)))
            }
            None => Ok(None),
        }
    }

    fn apply_delta(&mut self, account: &AccountId, delta: Decimal) {
        *self.deltas.entry(account.clone()).or_insert(Decimal::ZERO) += delta;
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let _guard = self.store.commit_lock.lock().await;
        let cf = self.store.cf()?;

        // Re-read every record snapshotted at read_for_update; a changed or
        // vanished value means another unit committed first.
        for (id, snapshot) in &self.reads {
            match self.store.db.get_cf(cf, id.as_str().as_bytes())? {
                Some(current) if current == *snapshot => {}
                _ => return Err(LedgerError::CommitConflict),
            }
        }

        let mut batch = WriteBatch::default();
        for (id, delta) in &self.deltas {
            let current = match self.store.db.get_cf(cf, id.as_str().as_bytes())? {
                Some(bytes) => RocksDbLedger::decode(&bytes)?,
                None => return Err(LedgerError::CommitConflict),
            };
            let next = current + *delta;
            if next < Decimal::ZERO {
                return Err(LedgerError::CommitConflict);
            }
            batch.put_cf(cf, id.as_str().as_bytes(), RocksDbLedger::encode(next)?);
        }

        self.store.db.write(batch)?;
        Ok(())
    }

    async fn abort(self: Box<Self>) {
        // Deltas were only queued in memory; nothing was written.
    }
}
