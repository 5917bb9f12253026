//! Adapters between external representations and the ledger core.

pub mod csv;
