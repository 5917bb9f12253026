use crate::domain::account::{AccountId, Balance};
use crate::domain::ports::LedgerStoreArc;
use crate::domain::transfer::TransferRequest;
use crate::error::{LedgerError, Result};

/// Default bound on commit attempts per transfer under contention.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Enforces transfer invariants and performs the atomic two-record mutation.
///
/// The engine holds no locks and no state of its own; every mutation runs
/// inside a unit of work acquired per call from the ledger store and resolved
/// (committed or aborted) before the call returns. Transfers on disjoint
/// account pairs proceed fully in parallel.
pub struct TransferEngine {
    store: LedgerStoreArc,
    max_attempts: u32,
}

impl TransferEngine {
    /// Creates an engine with the default retry bound.
    pub fn new(store: LedgerStoreArc) -> Self {
        Self::with_max_attempts(store, DEFAULT_MAX_ATTEMPTS)
    }

    /// Creates an engine with a custom bound on commit attempts.
    pub fn with_max_attempts(store: LedgerStoreArc, max_attempts: u32) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Moves `request.amount` from the source to the destination record,
    /// all-or-nothing.
    ///
    /// On a commit conflict the whole unit is retried from the beginning, up
    /// to the configured attempt bound; exhausting it fails with
    /// `TransferConflict`, which the caller may resubmit. After a successful
    /// return exactly one debit and one matching credit are durably visible
    /// together; on any failure, visible state is unchanged.
    pub async fn transfer(&self, request: &TransferRequest) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            match self.try_transfer(request).await {
                Err(e) if e.is_retryable() => {
                    tracing::debug!(
                        attempt,
                        source = %request.source,
                        destination = %request.destination,
                        "commit conflict, retrying transfer"
                    );
                }
                other => return other,
            }
        }
        tracing::warn!(
            attempts = self.max_attempts,
            source = %request.source,
            destination = %request.destination,
            "transfer retry budget exhausted"
        );
        Err(LedgerError::TransferConflict {
            attempts: self.max_attempts,
        })
    }

    /// One transfer attempt: validate against current state inside a unit of
    /// work and queue debit + credit for an atomic commit.
    async fn try_transfer(&self, request: &TransferRequest) -> Result<()> {
        let mut unit = self.store.begin().await?;

        let source_balance = match unit.read_for_update(&request.source).await? {
            Some(balance) => balance,
            None => {
                unit.abort().await;
                return Err(LedgerError::SourceNotFound);
            }
        };

        if !source_balance.covers(request.amount) {
            unit.abort().await;
            return Err(LedgerError::InsufficientFunds);
        }

        if unit.read_for_update(&request.destination).await?.is_none() {
            unit.abort().await;
            return Err(LedgerError::DestinationNotFound);
        }

        unit.apply_delta(&request.source, -request.amount.value());
        unit.apply_delta(&request.destination, request.amount.value());
        unit.commit().await
    }

    /// Side-effect-free read of one balance record.
    pub async fn balance(&self, account: &AccountId) -> Result<Option<Balance>> {
        self.store.balance(account).await
    }

    /// Creates the single balance record for a new account identity.
    ///
    /// Called once per identity by the identity-creation collaborator; the
    /// record is never deleted and is mutated only by transfers.
    pub async fn open_account(&self, account: AccountId, initial: Balance) -> Result<()> {
        if initial < Balance::ZERO {
            return Err(LedgerError::InvalidInitialBalance);
        }
        self.store.create_account(account, initial).await
    }

    /// Snapshot of every balance record.
    pub async fn balances(&self) -> Result<Vec<(AccountId, Balance)>> {
        self.store.all_balances().await
    }
}
