use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised while loading or decoding message/category row-sets.
///
/// Nothing in the pipeline recovers from these; they abort the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{source_name}: required column `{column}` is missing")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name} line {line}: id `{value}` is not an integer")]
    InvalidId { source_name: String, line: u64, value: String },

    #[error("row has {found} cells but the row-set has {expected} columns")]
    RowArity { expected: usize, found: usize },

    #[error("row {row}: message has no packed category string")]
    MissingCategories { row: usize },

    #[error("row {row}: category token `{token}` has no `-` separator")]
    MalformedToken { row: usize, token: String },

    #[error("row {row}: value `{value}` for `{column}` is not a base-10 integer")]
    InvalidValue { row: usize, column: String, value: String },

    #[error("row {row}: value {value} for `{column}` is outside {{0, 1, 2}}")]
    ValueOutOfDomain { row: usize, column: String, value: i64 },

    #[error("row {row}: expected {expected} category tokens, found {found}")]
    TokenCountMismatch { row: usize, expected: usize, found: usize },

    #[error("row {row}: category names {found:?} differ from {expected:?}")]
    SchemaDrift { row: usize, expected: Vec<String>, found: Vec<String> },

    #[error("indicator column `{0}` collides with an existing column")]
    DuplicateColumn(String),
}

pub type Result<T> = StdResult<T, PipelineError>;
