use crate::domain::account::{AccountId, Balance};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    account: &'a str,
    balance: Decimal,
}

/// Writes final balances as CSV (`account,balance`).
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
        }
    }

    /// Serializes the given balances in the order supplied.
    pub fn write_balances(&mut self, balances: &[(AccountId, Balance)]) -> csv::Result<()> {
        for (account, balance) in balances {
            self.writer.serialize(BalanceRow {
                account: account.as_str(),
                balance: balance.value(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
