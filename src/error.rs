//! Error types for list positional access, table removal and configuration.

use thiserror::Error;

/// Failure of a positional operation on a [`ChainedList`](crate::ChainedList).
///
/// The list is left unmodified whenever one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    #[error("no nodes in list")]
    Empty,
    #[error("node at index {index} does not exist")]
    IndexOutOfRange { index: usize },
}

/// Failure of [`HashTable::remove`](crate::HashTable::remove).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoveError {
    /// The bucket selected for the key holds no nodes at all.
    #[error("bucket {bucket} is empty")]
    BucketEmpty { bucket: usize },
    /// The bucket has entries, none of them with this key.
    #[error("key {key:?} not found")]
    KeyNotFound { key: String },
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    #[error("load factor must be in (0, 1], got {0}")]
    InvalidLoadFactor(f64),
    #[error("capacity must be at least one bucket")]
    ZeroCapacity,
}
