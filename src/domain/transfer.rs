use super::account::{AccountId, Amount};
use crate::error::LedgerError;
use rust_decimal::Decimal;

/// A validated request to move `amount` from `source` to `destination`.
///
/// Construction performs every check that needs no store access, so an
/// invalid request is rejected before a unit of work is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub source: AccountId,
    pub destination: AccountId,
    pub amount: Amount,
}

impl TransferRequest {
    /// Builds a request, rejecting non-positive amounts and self-transfers.
    pub fn new(
        source: AccountId,
        destination: AccountId,
        amount: Decimal,
    ) -> Result<Self, LedgerError> {
        let amount = Amount::new(amount)?;
        if source == destination {
            return Err(LedgerError::SelfTransfer);
        }
        Ok(Self {
            source,
            destination,
            amount,
        })
    }
}
