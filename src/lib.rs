//! A minimal ledger core: one balance record per account identity and an
//! atomic transfer operation between two records, safe under concurrent
//! requests touching the same account.
//!
//! The crate is layered hexagonally: `domain` holds the vocabulary and the
//! storage ports, `application` the transfer engine, `infrastructure` the
//! store backends, and `interfaces` the CSV adapters used by the batch
//! driver. Authentication and request routing are external collaborators;
//! the core consumes an opaque, already-authenticated account identifier.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
