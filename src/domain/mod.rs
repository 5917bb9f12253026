//! Domain types and ports for the ledger core.
//!
//! Defines the balance record vocabulary (`AccountId`, `Balance`, `Amount`),
//! the validated `TransferRequest`, and the storage ports implemented by the
//! infrastructure layer.

pub mod account;
pub mod ports;
pub mod transfer;
