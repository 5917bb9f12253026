use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Create a balance record with an initial balance.
    Open,
    /// Move an amount from `account` to `to`.
    Transfer,
}

/// One row of the ledger command file.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub r#type: CommandKind,
    pub account: String,
    pub to: Option<String>,
    pub amount: Option<Decimal>,
}

/// Reads ledger commands from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<Command>`,
/// handling whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    ///
    /// Parse failures stay at this layer as `csv::Error`; they never enter
    /// the ledger core.
    pub fn commands(self) -> impl Iterator<Item = csv::Result<Command>> {
        self.reader.into_deserialize()
    }
}
