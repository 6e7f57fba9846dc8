//! Input error types.

use thiserror::Error;

/// Fatal problems with an input dataset. Any of these aborts the whole
/// preparation call; no partial result is produced.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input had no header row
    #[error("input is empty: no header row found")]
    Empty,

    /// The encoding label is not one `encoding_rs` knows
    #[error("unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Bytes could not be decoded with the requested encoding
    #[error("input is not valid {encoding}")]
    Decode { encoding: &'static str },

    /// The CSV reader rejected the input (ragged rows, bad quoting, ...)
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Two headers collapse to the same name once whitespace is trimmed
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// A numeric column holds a value that is neither a number nor missing
    #[error("column {column} row {row}: {value:?} is not a number")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// A column does not have one cell per row
    #[error("column {column} has {actual} cells, dataset has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
