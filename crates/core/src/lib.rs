//! Core types for msgpipe
//!
//! The in-memory row-set, the CSV loader that merges messages with their
//! categories, and the decoder that expands packed category strings into
//! indicator columns.

pub mod constants;
mod decoder;
mod env_config;
mod error;
mod loader;
mod rowset;
mod value;

pub use decoder::*;
pub use env_config::*;
pub use error::*;
pub use loader::*;
pub use rowset::*;
pub use value::*;
