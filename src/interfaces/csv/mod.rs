//! CSV input/output for the batch driver.

pub mod balance_writer;
pub mod command_reader;
