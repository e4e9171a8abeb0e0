//! Typed error enum for the storage layer.

use thiserror::Error;

/// Storage-layer error.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQL / connection / constraint failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Table or column name that cannot be used as an SQL identifier.
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// A table needs at least one column.
    #[error("row-set for table {table} has no columns")]
    EmptySchema { table: String },

    /// Stored rows could not be rebuilt into a row-set.
    #[error("data corruption: {context}")]
    DataCorruption {
        context: String,
        #[source]
        source: msgpipe_core::PipelineError,
    },

    /// Read-back of a table that does not exist.
    #[error("not found: table {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;
