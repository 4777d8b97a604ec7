//! Pluggable key equality and key hashing.
//!
//! The map never compares or hashes keys on its own; it only calls the
//! strategies it was built with. Closures implement both traits, so
//! `|a: &u32, b: &u32| a == b` and `|k: &u32| u64::from(*k)` work directly.
//!
//! Strategies must be total, deterministic and consistent with each other:
//! `key_eq(a, b)` implies `key_hash(a) == key_hash(b)`. The map does not
//! check this; breaking it makes lookups unreliable but never unsafe.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Key equality strategy.
pub trait KeyEq<K: ?Sized> {
    fn key_eq(&self, a: &K, b: &K) -> bool;
}

/// Key hashing strategy.
pub trait KeyHash<K: ?Sized> {
    fn key_hash(&self, key: &K) -> u64;
}

impl<K: ?Sized, F> KeyEq<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

impl<K: ?Sized, F> KeyHash<K> for F
where
    F: Fn(&K) -> u64,
{
    #[inline]
    fn key_hash(&self, key: &K) -> u64 {
        self(key)
    }
}

/// Equality through `PartialEq`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultEq;

impl<K: ?Sized + PartialEq> KeyEq<K> for DefaultEq {
    #[inline]
    fn key_eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Hashing through `core::hash::Hash` and a `BuildHasher`.
///
/// Cloning copies the hasher state, so a cloned map hashes keys identically.
#[derive(Clone, Debug, Default)]
pub struct DefaultHash<S = DefaultHashBuilder> {
    build_hasher: S,
}

impl<S: BuildHasher> DefaultHash<S> {
    pub fn with_build_hasher(build_hasher: S) -> Self {
        Self { build_hasher }
    }
}

impl<K: ?Sized + Hash, S: BuildHasher> KeyHash<K> for DefaultHash<S> {
    #[inline]
    fn key_hash(&self, key: &K) -> u64 {
        self.build_hasher.hash_one(key)
    }
}
