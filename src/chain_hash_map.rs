//! ChainHashMap: bucket table of singly-linked chains over a node arena.
//!
//! Nodes live in a generational `SlotMap`; buckets and `next` links hold
//! slot keys. A rehash rewrites links only, so a node keeps its slot key
//! (and any `Handle` to it) for as long as the entry exists.

use crate::error::{MapError, Result};
use crate::policy;
use crate::reentrancy::ReentrancyCheck;
use crate::strategy::{DefaultEq, DefaultHash, KeyEq, KeyHash};
use core::fmt;
use core::hash::Hash;
use core::ops::Index;
use log::{debug, trace, warn};
use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one entry. Survives rehashing; never resolves after
/// the entry is removed, even if its slot is reused.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, K, V, E, H>(&self, map: &'a ChainHashMap<K, V, E, H>) -> Option<&'a K> {
        map.nodes.get(self.0).map(|n| &n.key)
    }

    pub fn value<'a, K, V, E, H>(&self, map: &'a ChainHashMap<K, V, E, H>) -> Option<&'a V> {
        map.nodes.get(self.0).map(|n| &n.value)
    }

    pub fn value_mut<'a, K, V, E, H>(
        &self,
        map: &'a mut ChainHashMap<K, V, E, H>,
    ) -> Option<&'a mut V> {
        map.nodes.get_mut(self.0).map(|n| &mut n.value)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Cached strategy hash; bucket indices are derived from it on rehash.
    hash: u64,
    pub(crate) next: Option<DefaultKey>,
}

/// Separately chained hash map with prime-sized tables.
///
/// `E` decides key equality and `H` produces key hashes; see
/// [`crate::strategy`]. The table grows when the load factor passes 0.7 and
/// shrinks on removal when it drops under 0.3, but never below the size it
/// was constructed with.
pub struct ChainHashMap<K, V, E = DefaultEq, H = DefaultHash> {
    equate: E,
    hasher: H,
    pub(crate) buckets: Vec<Option<DefaultKey>>,
    pub(crate) nodes: SlotMap<DefaultKey, Node<K, V>>,
    min_table_size: usize,
    reentrancy: ReentrancyCheck,
}

impl<K, V> ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_strategies(DefaultEq, DefaultHash::default())
    }

    /// Size the table for `expected` entries up front.
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_strategies_and_capacity(DefaultEq, DefaultHash::default(), expected)
    }
}

impl<K, V> Default for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E, H> ChainHashMap<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    pub fn with_strategies(equate: E, hasher: H) -> Self {
        Self::from_parts(equate, hasher, policy::MIN_TABLE_SIZE)
    }

    /// Like [`Self::try_with_strategies_and_capacity`], but an unsatisfiable
    /// hint falls back to the minimum table and lets the map grow on demand.
    pub fn with_strategies_and_capacity(equate: E, hasher: H, expected: usize) -> Self {
        let size = match policy::initial_table_size(Some(expected)) {
            Some(size) => size,
            None => {
                warn!(
                    "expected count {} exceeds the maximum table size {}; starting at {} buckets",
                    expected,
                    policy::MAX_TABLE_SIZE,
                    policy::MIN_TABLE_SIZE
                );
                policy::MIN_TABLE_SIZE
            }
        };
        Self::from_parts(equate, hasher, size)
    }

    /// Table starts at the smallest prime `>= expected / 0.7` (or 2 when
    /// `expected` is zero) and never shrinks below that size.
    pub fn try_with_strategies_and_capacity(equate: E, hasher: H, expected: usize) -> Result<Self> {
        let size = policy::initial_table_size(Some(expected)).ok_or(MapError::CapacityExceeded {
            expected,
            max: policy::MAX_TABLE_SIZE,
        })?;
        Ok(Self::from_parts(equate, hasher, size))
    }

    fn from_parts(equate: E, hasher: H, table_size: usize) -> Self {
        trace!("new chain map with {} buckets", table_size);
        Self {
            equate,
            hasher,
            buckets: vec![None; table_size],
            nodes: SlotMap::with_key(),
            min_table_size: table_size,
            reentrancy: ReentrancyCheck::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current number of buckets.
    pub fn table_size(&self) -> usize {
        self.buckets.len()
    }

    pub fn equate(&self) -> &E {
        &self.equate
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// Hash `key` and walk its chain. The only place user strategies run.
    fn lookup(&self, op: &'static str, key: &K) -> (u64, Option<DefaultKey>) {
        let _g = self.reentrancy.enter(op);
        let hash = self.hasher.key_hash(key);
        (hash, self.locate(key, hash))
    }

    /// Walk the chain for `hash` looking for a key equal to `key`.
    fn locate(&self, key: &K, hash: u64) -> Option<DefaultKey> {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.hash == hash && self.equate.key_eq(&node.key, key) {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    /// Position of the first node in bucket `idx` matching `is_target`,
    /// as `(predecessor, node)`.
    fn find_link<F>(&self, idx: usize, mut is_target: F) -> Option<(Option<DefaultKey>, DefaultKey)>
    where
        F: FnMut(DefaultKey, &Node<K, V>) -> bool,
    {
        let mut prev = None;
        let mut cur = self.buckets[idx];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if is_target(k, node) {
                return Some((prev, k));
            }
            prev = Some(k);
            cur = node.next;
        }
        None
    }

    /// Splice `k` out of bucket `idx` and free its slot.
    fn unlink(&mut self, idx: usize, prev: Option<DefaultKey>, k: DefaultKey) -> Option<Node<K, V>> {
        let next = self.nodes.get(k)?.next;
        match prev {
            None => self.buckets[idx] = next,
            Some(p) => self.nodes[p].next = next,
        }
        self.nodes.remove(k)
    }

    /// Prepend a fresh node to its bucket. Caller has ruled out duplicates.
    fn link_new(&mut self, key: K, value: V, hash: u64) -> DefaultKey {
        let idx = self.bucket_of(hash);
        let next = self.buckets[idx];
        let k = self.nodes.insert(Node {
            key,
            value,
            hash,
            next,
        });
        self.buckets[idx] = Some(k);
        k
    }

    /// Add `key -> value`; fails with `DuplicateKey` if an equal key exists.
    pub fn add(&mut self, key: K, value: V) -> Result<Handle> {
        let (hash, found) = self.lookup("add", &key);
        if found.is_some() {
            return Err(MapError::DuplicateKey);
        }
        let k = self.link_new(key, value, hash);
        self.grow_if_needed();
        Ok(Handle(k))
    }

    /// Like `add`, but only builds the value when the key is absent.
    pub fn add_with<F>(&mut self, key: K, default: F) -> Result<Handle>
    where
        F: FnOnce() -> V,
    {
        let (hash, found) = self.lookup("add_with", &key);
        if found.is_some() {
            return Err(MapError::DuplicateKey);
        }
        let k = self.link_new(key, default(), hash);
        self.grow_if_needed();
        Ok(Handle(k))
    }

    /// `add` reporting success as a bool.
    pub fn try_add(&mut self, key: K, value: V) -> bool {
        self.add(key, value).is_ok()
    }

    /// Insert or overwrite. Returns the previous value when the key existed;
    /// an overwrite keeps the node in place and never rehashes.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let (hash, found) = self.lookup("set", &key);
        if let Some(k) = found {
            return Some(core::mem::replace(&mut self.nodes[k].value, value));
        }
        self.link_new(key, value, hash);
        self.grow_if_needed();
        None
    }

    pub fn get(&self, key: &K) -> Result<&V> {
        self.try_get(key).ok_or(MapError::KeyNotFound)
    }

    pub fn try_get(&self, key: &K) -> Option<&V> {
        let (_, found) = self.lookup("get", key);
        found.map(|k| &self.nodes[k].value)
    }

    /// Value for `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.try_get(key).unwrap_or(default)
    }

    pub fn get_mut(&mut self, key: &K) -> Result<&mut V> {
        let (_, found) = self.lookup("get_mut", key);
        match found {
            Some(k) => Ok(&mut self.nodes[k].value),
            None => Err(MapError::KeyNotFound),
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.lookup("contains_key", key).1.is_some()
    }

    /// Handle to the entry for `key`, if present.
    pub fn find(&self, key: &K) -> Option<Handle> {
        self.lookup("find", key).1.map(Handle)
    }

    fn take(&mut self, key: &K) -> Option<(K, V)> {
        let (idx, found) = {
            let _g = self.reentrancy.enter("remove");
            let hash = self.hasher.key_hash(key);
            let idx = self.bucket_of(hash);
            let equate = &self.equate;
            let found = self.find_link(idx, |_, node| {
                node.hash == hash && equate.key_eq(&node.key, key)
            });
            (idx, found)
        };
        let (prev, k) = found?;
        self.unlink(idx, prev, k).map(|node| (node.key, node.value))
    }

    /// Remove `key` and return its value, shrinking the table when the load
    /// factor falls under 0.3.
    pub fn remove(&mut self, key: &K) -> Result<V> {
        let (_, value) = self.take(key).ok_or(MapError::KeyNotFound)?;
        self.shrink_if_needed();
        Ok(value)
    }

    /// `remove` reporting absence as `None`.
    pub fn try_remove(&mut self, key: &K) -> Option<V> {
        self.remove(key).ok()
    }

    /// Remove without ever resizing. Pair with [`Self::trim`] after a batch.
    pub fn remove_without_shrink(&mut self, key: &K) -> Result<V> {
        self.take(key)
            .map(|(_, value)| value)
            .ok_or(MapError::KeyNotFound)
    }

    /// Remove the entry behind `handle`; `None` if it is already gone.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let hash = self.nodes.get(handle.0)?.hash;
        let idx = self.bucket_of(hash);
        let (prev, k) = self.find_link(idx, |k, _| k == handle.0)?;
        let node = self.unlink(idx, prev, k)?;
        self.shrink_if_needed();
        Some((node.key, node.value))
    }

    /// Rehash into the smallest prime `>= len()`, regardless of current size.
    pub fn trim(&mut self) {
        if let Some(size) = policy::trim_target(self.len()) {
            self.rehash(size);
        }
    }

    /// Drop every entry and return to the construction-time table size.
    pub fn clear(&mut self) {
        debug!(
            "clearing chain map: {} entries, {} -> {} buckets",
            self.len(),
            self.buckets.len(),
            self.min_table_size
        );
        self.nodes.clear();
        self.buckets = vec![None; self.min_table_size];
    }

    fn grow_if_needed(&mut self) {
        let count = self.len();
        if !policy::exceeds_max_load(count, self.buckets.len()) {
            return;
        }
        match policy::grow_target(count) {
            Some(size) => self.rehash(size),
            None => warn!(
                "chain map growth skipped: {} entries would need more than {} buckets",
                count,
                policy::MAX_TABLE_SIZE
            ),
        }
    }

    fn shrink_if_needed(&mut self) {
        let count = self.len();
        let size = self.buckets.len();
        if size <= self.min_table_size || !policy::below_min_load(count, size) {
            return;
        }
        if let Some(target) = policy::shrink_target(count, self.min_table_size) {
            self.rehash(target);
        }
    }

    /// Relink every node into a fresh table of `new_size` buckets.
    fn rehash(&mut self, new_size: usize) {
        let old_size = self.buckets.len();
        if new_size == old_size {
            return;
        }
        let old = core::mem::replace(&mut self.buckets, vec![None; new_size]);
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let node = &mut self.nodes[k];
                cur = node.next;
                let idx = (node.hash % new_size as u64) as usize;
                node.next = self.buckets[idx];
                self.buckets[idx] = Some(k);
            }
        }
        debug!(
            "rehashed chain map: {} entries, {} -> {} buckets",
            self.nodes.len(),
            old_size,
            new_size
        );
    }
}

impl<K, V, E, H> Clone for ChainHashMap<K, V, E, H>
where
    K: Clone,
    V: Clone,
    E: Clone,
    H: Clone,
{
    /// Deep copy: same pairs, same table size, same chain layout.
    fn clone(&self) -> Self {
        Self {
            equate: self.equate.clone(),
            hasher: self.hasher.clone(),
            buckets: self.buckets.clone(),
            nodes: self.nodes.clone(),
            min_table_size: self.min_table_size,
            reentrancy: ReentrancyCheck::new(),
        }
    }
}

impl<K, V, E, H> Index<&K> for ChainHashMap<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    type Output = V;

    /// # Panics
    ///
    /// If `key` is not present.
    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

/// Upserts each pair, so later pairs win over earlier ones with equal keys.
impl<K, V, E, H> Extend<(K, V)> for ChainHashMap<K, V, E, H>
where
    E: KeyEq<K>,
    H: KeyHash<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity(iter.size_hint().0);
        map.extend(iter);
        map
    }
}

impl<K, V, E, H> fmt::Debug for ChainHashMap<K, V, E, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.nodes.values().map(|n| (&n.key, &n.value)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    type EqFn = fn(&u64, &u64) -> bool;
    type HashFn = fn(&u64) -> u64;

    fn eq_u64(a: &u64, b: &u64) -> bool {
        a == b
    }

    fn identity(k: &u64) -> u64 {
        *k
    }

    fn numeric() -> ChainHashMap<u64, u64, EqFn, HashFn> {
        ChainHashMap::with_strategies(eq_u64 as EqFn, identity as HashFn)
    }

    fn numeric_with_capacity(expected: usize) -> ChainHashMap<u64, u64, EqFn, HashFn> {
        ChainHashMap::with_strategies_and_capacity(eq_u64 as EqFn, identity as HashFn, expected)
    }

    fn chain_lengths<K, V, E, H>(m: &ChainHashMap<K, V, E, H>) -> Vec<usize> {
        m.buckets
            .iter()
            .map(|head| {
                let mut n = 0;
                let mut cur = *head;
                while let Some(k) = cur {
                    n += 1;
                    cur = m.nodes[k].next;
                }
                n
            })
            .collect()
    }

    /// Invariant: every node sits in the bucket its cached hash maps to, and
    /// every live node is reachable from exactly one bucket.
    fn assert_well_formed<K, V, E: KeyEq<K>, H: KeyHash<K>>(m: &ChainHashMap<K, V, E, H>) {
        let mut seen = BTreeSet::new();
        for (idx, head) in m.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(k) = cur {
                let node = &m.nodes[k];
                assert_eq!((node.hash % m.buckets.len() as u64) as usize, idx);
                assert!(seen.insert(k), "node linked twice");
                cur = node.next;
            }
        }
        assert_eq!(seen.len(), m.nodes.len());
        assert_eq!(chain_lengths(m).iter().sum::<usize>(), m.len());
    }

    #[test]
    fn new_map_starts_at_two_buckets() {
        let m: ChainHashMap<String, i32> = ChainHashMap::new();
        assert_eq!(m.table_size(), 2);
        assert!(m.is_empty());
    }

    #[test]
    fn duplicate_add_rejected_and_map_unchanged() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        m.add("a".to_string(), 1).unwrap();
        assert_eq!(m.add("a".to_string(), 2), Err(MapError::DuplicateKey));
        assert!(!m.try_add("a".to_string(), 3));
        assert_eq!(m.get(&"a".to_string()), Ok(&1));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn growth_follows_prime_schedule() {
        let mut m = numeric();
        let mut sizes = vec![m.table_size()];
        for k in 1..=1000 {
            m.add(k, k * 10).unwrap();
            if *sizes.last().unwrap() != m.table_size() {
                sizes.push(m.table_size());
            }
            assert!(!policy::exceeds_max_load(m.len(), m.table_size()));
        }
        assert_eq!(
            sizes,
            vec![2, 7, 17, 37, 79, 163, 331, 673, 1361, 2729]
        );
        assert_well_formed(&m);
    }

    #[test]
    fn rehash_keeps_node_identity() {
        let mut m = numeric();
        let h = m.add(5, 50).unwrap();
        for k in 100..200 {
            m.add(k, k).unwrap();
        }
        assert_ne!(m.table_size(), 2);
        assert_eq!(m.find(&5), Some(h));
        assert_eq!(h.value(&m), Some(&50));
    }

    #[test]
    fn colliding_keys_chain_in_one_bucket() {
        let mut m: ChainHashMap<u64, u64, _, _> =
            ChainHashMap::with_strategies(|a: &u64, b: &u64| a == b, |_: &u64| 0u64);
        for k in 0..10 {
            m.add(k, k).unwrap();
        }
        let lens = chain_lengths(&m);
        assert_eq!(lens[0], 10);
        assert!(lens[1..].iter().all(|&n| n == 0));

        // Remove head, interior and tail positions of the chain.
        assert_eq!(m.remove_without_shrink(&9), Ok(9));
        assert_eq!(m.remove_without_shrink(&5), Ok(5));
        assert_eq!(m.remove_without_shrink(&0), Ok(0));
        assert_eq!(m.remove_without_shrink(&5), Err(MapError::KeyNotFound));
        assert_eq!(m.len(), 7);
        assert_well_formed(&m);
        for k in [1, 2, 3, 4, 6, 7, 8] {
            assert_eq!(m.get(&k), Ok(&k));
        }
    }

    #[test]
    fn remove_shrinks_but_not_below_minimum() {
        let mut m = numeric();
        for k in 0..100 {
            m.add(k, k).unwrap();
        }
        let grown = m.table_size();
        for k in 0..95 {
            m.remove(&k).unwrap();
            assert!(
                m.table_size() <= 2 || !policy::below_min_load(m.len(), m.table_size()),
                "load fell under 0.3 after removal: {} / {}",
                m.len(),
                m.table_size()
            );
        }
        assert!(m.table_size() < grown);
        for k in 95..100 {
            m.remove(&k).unwrap();
        }
        assert_eq!(m.table_size(), 2);
        assert_well_formed(&m);
    }

    #[test]
    fn hinted_minimum_is_respected_on_shrink() {
        let mut m = numeric_with_capacity(100);
        // 100 / 0.7 = 142.8..., next prime 149.
        assert_eq!(m.table_size(), 149);
        m.add(1, 1).unwrap();
        m.remove(&1).unwrap();
        assert_eq!(m.table_size(), 149);
    }

    #[test]
    fn batch_removal_then_trim() {
        let mut m = numeric();
        for k in 0..500 {
            m.add(k, k).unwrap();
        }
        let before = m.table_size();
        for k in 0..490 {
            m.remove_without_shrink(&k).unwrap();
        }
        assert_eq!(m.table_size(), before);
        m.trim();
        assert_eq!(m.table_size(), 11);
        assert_well_formed(&m);
        for k in 490..500 {
            assert_eq!(m[&k], k);
        }
    }

    #[test]
    fn trim_on_empty_map_uses_two_buckets() {
        let mut m = numeric_with_capacity(50);
        m.trim();
        assert_eq!(m.table_size(), 2);
    }

    #[test]
    fn remove_handle_unlinks_and_invalidates() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        let h = m.add("k".to_string(), 1).unwrap();
        let other = m.add("j".to_string(), 2).unwrap();
        assert_eq!(m.remove_handle(h), Some(("k".to_string(), 1)));
        assert_eq!(m.remove_handle(h), None);
        assert!(h.key(&m).is_none());
        assert_eq!(other.value(&m), Some(&2));
        assert_well_formed(&m);
    }

    #[test]
    fn set_overwrites_in_place() {
        let mut m: ChainHashMap<&'static str, i32> = ChainHashMap::new();
        assert_eq!(m.set("x", 1), None);
        let h = m.find(&"x").unwrap();
        let size = m.table_size();
        assert_eq!(m.set("x", 2), Some(1));
        assert_eq!(m.len(), 1);
        assert_eq!(m.table_size(), size);
        assert_eq!(m.find(&"x"), Some(h));
        assert_eq!(m.get(&"x"), Ok(&2));
    }

    #[test]
    fn add_with_is_lazy_on_duplicate() {
        let mut m: ChainHashMap<&'static str, String> = ChainHashMap::new();
        let mut calls = 0;
        m.add_with("k", || {
            calls += 1;
            "v".to_string()
        })
        .unwrap();
        let r = m.add_with("k", || {
            calls += 1;
            "w".to_string()
        });
        assert_eq!(r, Err(MapError::DuplicateKey));
        assert_eq!(calls, 1);
        assert_eq!(m.get(&"k").map(String::as_str), Ok("v"));
    }

    #[test]
    fn clear_resets_to_minimum() {
        let mut m = numeric();
        for k in 0..50 {
            m.add(k, k).unwrap();
        }
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.table_size(), 2);
        assert!(!m.contains_key(&3));
        m.add(3, 3).unwrap();
        assert_eq!(m.get(&3), Ok(&3));
    }

    #[test]
    fn clone_is_deep_and_same_shape() {
        let mut m: ChainHashMap<String, Vec<i32>> = ChainHashMap::new();
        for i in 0..20 {
            m.add(format!("k{i}"), vec![i]).unwrap();
        }
        let mut c = m.clone();
        assert_eq!(c.table_size(), m.table_size());
        assert_eq!(chain_lengths(&c), chain_lengths(&m));
        c.get_mut(&"k3".to_string()).unwrap().push(99);
        c.remove(&"k4".to_string()).unwrap();
        assert_eq!(m.get(&"k3".to_string()), Ok(&vec![3]));
        assert!(m.contains_key(&"k4".to_string()));
    }

    #[test]
    fn get_or_and_missing_lookups() {
        let mut m: ChainHashMap<u8, &'static str> = ChainHashMap::new();
        m.add(1, "one").unwrap();
        assert_eq!(*m.get_or(&1, &"none"), "one");
        assert_eq!(*m.get_or(&2, &"none"), "none");
        assert_eq!(m.get(&2), Err(MapError::KeyNotFound));
        assert_eq!(m.get_mut(&2).err(), Some(MapError::KeyNotFound));
        assert_eq!(m.remove(&2), Err(MapError::KeyNotFound));
        assert_eq!(m.try_remove(&2), None);
        assert_eq!(m.len(), 1);
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn index_panics_on_missing_key() {
        let m: ChainHashMap<u8, u8> = ChainHashMap::new();
        let _ = m[&7];
    }

    #[test]
    fn try_constructor_reports_capacity_exceeded() {
        let r = ChainHashMap::<u64, u64, EqFn, HashFn>::try_with_strategies_and_capacity(
            eq_u64,
            identity,
            usize::MAX,
        );
        assert!(matches!(r, Err(MapError::CapacityExceeded { .. })));

        let m = numeric_with_capacity(usize::MAX);
        assert_eq!(m.table_size(), 2);
    }

    /// Invariant (debug-only): an equality strategy that calls back into the
    /// same map while a lookup is walking a chain panics.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrant_equality_panics() {
        use std::cell::Cell;
        use std::rc::Rc;

        type Map = ChainHashMap<u64, u64, Box<dyn Fn(&u64, &u64) -> bool>, HashFn>;
        fn zero(_: &u64) -> u64 {
            0
        }
        let slot: Rc<Cell<*const Map>> = Rc::new(Cell::new(core::ptr::null()));
        let probe = Rc::clone(&slot);
        let eq: Box<dyn Fn(&u64, &u64) -> bool> = Box::new(move |a, b| {
            let p = probe.get();
            if !p.is_null() {
                // SAFETY: the map outlives every call made through it below.
                let _ = unsafe { &*p }.contains_key(a);
            }
            a == b
        });
        let mut m: Map = ChainHashMap::with_strategies(eq, zero as HashFn);
        m.add(1, 1).unwrap();
        slot.set(&m as *const Map);

        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.get(&2);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
