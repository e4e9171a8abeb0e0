//! Storage layer for msgpipe
//!
//! SQLite sink that persists a decoded row-set as one named table, replacing
//! whatever the table held before.

mod error;
mod storage;
#[cfg(test)]
mod tests;

pub use error::{Result, StorageError};
pub use storage::{Storage, quote_identifier};
