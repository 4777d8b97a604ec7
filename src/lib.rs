//! chain-hashmap: a separately chained hash map with pluggable key
//! equality and hashing, prime-sized tables, and load-factor driven
//! growth and shrinkage.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a mutable associative container whose only knowledge of keys
//!   comes from two user-supplied strategies, so any key type works as long
//!   as the caller can say when two keys are equal and how to hash one.
//! - Layers:
//!   - `policy`: pure functions for watermarks and prime table sizes.
//!   - `ChainHashMap<K, V, E, H>`: bucket table of singly-linked chains.
//!     Nodes live in a generational arena and chains link them by slot key.
//!   - `stepper`: visitor and iterator enumeration, with early exit through
//!     `ControlFlow`.
//!
//! Constraints
//! - Single owner, unsynchronized: the map is `Send` when its contents are,
//!   never `Sync`. Share it across threads only behind a lock.
//! - Table sizes are prime (2 is the minimum). After `add`/`set` the load
//!   factor is at most 0.7; a shrinking removal keeps it at least 0.3 unless
//!   the table is already at its construction-time size.
//! - Unique keys: `add` on an existing key fails and leaves the map as it was.
//!
//! Rehashing
//! - Each node caches the hash its strategy produced at insertion. A rehash
//!   only relinks nodes by that cached hash; keys and values never move and
//!   strategies are never called during a resize. `Handle`s therefore stay
//!   valid across any number of resizes.
//! - Growth that would need more than `MAX_TABLE_SIZE` buckets is skipped
//!   with a `log::warn!`; the map keeps working at a higher load factor.
//!
//! Reentrancy
//! - Strategies run while a chain is being walked. Calling back into the
//!   same map from a strategy panics in debug builds.
//! - Visitors may read the map through `&self` steppers. The `_mut`
//!   steppers hold `&mut self`, so a visitor can only change the value it
//!   was given.
//!
//! Notes and non-goals
//! - No ordering guarantees; enumeration order changes across rehashes.
//! - No multimap semantics, no persistence.

pub mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod error;
pub mod policy;
mod reentrancy;
pub mod stepper;
pub mod strategy;

// Public surface
pub use chain_hash_map::{ChainHashMap, Handle};
pub use error::{MapError, Result};
pub use strategy::{DefaultEq, DefaultHash, KeyEq, KeyHash};
