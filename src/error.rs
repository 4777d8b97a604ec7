//! Error type shared by every fallible map operation.

use thiserror::Error;

/// Why a map operation did not take effect.
///
/// Every variant leaves the map exactly as it was before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// `add` found an entry whose key is equal to the one being added.
    #[error("attempted to add a key that is already present in the map")]
    DuplicateKey,

    /// No entry with an equal key exists.
    #[error("key not found in the map")]
    KeyNotFound,

    /// An expected-count hint needs a table larger than the maximum table size.
    #[error("expected count {expected} needs more than {max} buckets")]
    CapacityExceeded {
        /// The requested expected count
        expected: usize,
        /// The largest table size the map will allocate
        max: usize,
    },
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, MapError>;
