//! chain-table: a resizable, string-keyed hash table with separate
//! chaining, built over its own singly linked list.
//!
//! Internal Design:
//!
//! Summary
//! - Two layers, leaves first:
//!   - ChainedList<V>: singly linked key/value chain. Nodes live in a
//!     per-list `SlotMap` and link through generational keys; callers
//!     address nodes with copyable `Handle`s.
//!   - HashTable<V>: `capacity` buckets, one ChainedList each. Hashes a key
//!     to a bucket and delegates lookup/insert/remove to that chain.
//!
//! Constraints
//! - Single-threaded; mutation requires `&mut self`, so a resize is never
//!   observable half-done.
//! - Every chain operation walks from the head. Lists keep no length and
//!   no tail pointer.
//! - Keys are unique within the table; `set` on a present key overwrites
//!   the value in place.
//!
//! Hashing and growth
//! - Bucket index is `h = (31 * h + unit) % capacity` over the key's UTF-16
//!   code units, reduced at every step. It depends on the current capacity
//!   and is never cached.
//! - After a `set` appends a new key, if the entry count exceeds
//!   `capacity * load_factor` the table doubles once and reinserts every
//!   entry in bucket order. Capacity never shrinks, including on `clear`.
//!
//! Errors
//! - Absence is `Option`. Positional list failures are `ListError`;
//!   `HashTable::remove` tells an empty bucket (`RemoveError::BucketEmpty`)
//!   apart from a missing key (`RemoveError::KeyNotFound`).
//!
//! Logging
//! - Emits through the `log` facade only: `debug!` on growth and clear,
//!   `trace!` on rejected positional access.

pub mod chained_list;
pub mod config;
pub mod error;
pub mod hash_table;
mod hash_table_proptest;

// Public surface
pub use chained_list::{ChainedList, Handle};
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR};
pub use error::{ConfigError, ListError, RemoveError};
pub use hash_table::{rolling_hash, HashTable};
