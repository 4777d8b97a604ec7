//! Enumeration over a `ChainHashMap`.
//!
//! Two styles are offered. Steppers hand each entry to a visitor closure;
//! the `try_` forms stop as soon as the visitor returns
//! `ControlFlow::Break` and pass the break value back. Iterators cover the
//! usual `iter`/`keys`/`values` family.
//!
//! Steppers and `iter` walk buckets in index order and each chain from its
//! head. `iter_mut`/`values_mut` walk the node arena instead. Neither order is
//! stable across a rehash and callers should not depend on it.
//!
//! The `_mut` forms borrow the map mutably for the whole traversal, so the
//! only mutation a visitor can make is to the value it was handed.

use crate::chain_hash_map::{ChainHashMap, Node};
use core::iter::FusedIterator;
use core::ops::ControlFlow;
use slotmap::{DefaultKey, SlotMap};

impl<K, V, E, H> ChainHashMap<K, V, E, H> {
    fn walk<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&K, &V) -> ControlFlow<B>,
    {
        for head in &self.buckets {
            let mut cur = *head;
            while let Some(k) = cur {
                let node = &self.nodes[k];
                if let ControlFlow::Break(b) = visit(&node.key, &node.value) {
                    return ControlFlow::Break(b);
                }
                cur = node.next;
            }
        }
        ControlFlow::Continue(())
    }

    fn walk_mut<B, F>(&mut self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&K, &mut V) -> ControlFlow<B>,
    {
        for idx in 0..self.buckets.len() {
            let mut cur = self.buckets[idx];
            while let Some(k) = cur {
                let node = &mut self.nodes[k];
                if let ControlFlow::Break(b) = visit(&node.key, &mut node.value) {
                    return ControlFlow::Break(b);
                }
                cur = node.next;
            }
        }
        ControlFlow::Continue(())
    }

    /// Visit every key/value pair.
    pub fn for_each<F: FnMut(&K, &V)>(&self, mut visit: F) {
        let _ = self.walk(|k, v| {
            visit(k, v);
            ControlFlow::<()>::Continue(())
        });
    }

    /// Visit key/value pairs until the visitor breaks.
    pub fn try_for_each<B, F>(&self, visit: F) -> ControlFlow<B>
    where
        F: FnMut(&K, &V) -> ControlFlow<B>,
    {
        self.walk(visit)
    }

    pub fn for_each_key<F: FnMut(&K)>(&self, mut visit: F) {
        self.for_each(|k, _| visit(k));
    }

    pub fn try_for_each_key<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&K) -> ControlFlow<B>,
    {
        self.walk(|k, _| visit(k))
    }

    pub fn for_each_value<F: FnMut(&V)>(&self, mut visit: F) {
        self.for_each(|_, v| visit(v));
    }

    pub fn try_for_each_value<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&V) -> ControlFlow<B>,
    {
        self.walk(|_, v| visit(v))
    }

    /// Visit every pair with a mutable value. Never rehashes.
    pub fn for_each_mut<F: FnMut(&K, &mut V)>(&mut self, mut visit: F) {
        let _ = self.walk_mut(|k, v| {
            visit(k, v);
            ControlFlow::<()>::Continue(())
        });
    }

    pub fn try_for_each_mut<B, F>(&mut self, visit: F) -> ControlFlow<B>
    where
        F: FnMut(&K, &mut V) -> ControlFlow<B>,
    {
        self.walk_mut(visit)
    }

    pub fn for_each_value_mut<F: FnMut(&mut V)>(&mut self, mut visit: F) {
        self.for_each_mut(|_, v| visit(v));
    }

    pub fn try_for_each_value_mut<B, F>(&mut self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(&mut V) -> ControlFlow<B>,
    {
        self.walk_mut(|_, v| visit(v))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            nodes: &self.nodes,
            cur: None,
            remaining: self.nodes.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.nodes.values_mut(),
        }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

/// Iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Option<DefaultKey>>,
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(k) = self.cur {
                let node = &self.nodes[k];
                self.cur = node.next;
                self.remaining -= 1;
                return Some((&node.key, &node.value));
            }
            // Skip empty buckets; exhausting the table ends iteration.
            self.cur = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
            nodes: self.nodes,
            cur: self.cur,
            remaining: self.remaining,
        }
    }
}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in arena order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::ValuesMut<'a, DefaultKey, Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|n| (&n.key, &mut n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

impl<'a, K, V, E, H> IntoIterator for &'a ChainHashMap<K, V, E, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, E, H> IntoIterator for &'a mut ChainHashMap<K, V, E, H> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
