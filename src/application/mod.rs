//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `TransferEngine`, the primary entry point for
//! moving funds between balance records. Every mutation goes through a unit
//! of work obtained from the ledger store, with a bounded retry loop on
//! commit conflicts.

pub mod engine;
