//! Bounded, bidirectional in-order scans.
//!
//! A scan keeps an explicit stack of pending nodes instead of recursing.
//! Each node's key is tested against both bounds once. A node below the
//! lower bound cannot have anything in range on its low side, so that
//! subtree is never pushed; the same holds for the high side. A window
//! holding `k` live matches costs `O(log n + k)` steps.

use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::mem;

use crate::arena::Arena;
use crate::types::{Dir, Handle};

/// Bounds and direction of a scan.
///
/// `low` and `high` of `None` leave that side open. Both bounds are
/// inclusive unless switched off. The default is an ascending scan over
/// everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraverseOptions<K> {
    pub reverse: bool,
    pub low: Option<K>,
    pub high: Option<K>,
    pub include_low: bool,
    pub include_high: bool,
}

impl<K> Default for TraverseOptions<K> {
    fn default() -> Self {
        Self {
            reverse: false,
            low: None,
            high: None,
            include_low: true,
            include_high: true,
        }
    }
}

impl<K> TraverseOptions<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan from high to low.
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn low(mut self, key: K) -> Self {
        self.low = Some(key);
        self
    }

    pub fn high(mut self, key: K) -> Self {
        self.high = Some(key);
        self
    }

    pub fn exclude_low(mut self) -> Self {
        self.include_low = false;
        self
    }

    pub fn exclude_high(mut self) -> Self {
        self.include_high = false;
        self
    }
}

/// Lazy scan over live `(key, value)` pairs.
///
/// Created by [`RbTree::entries`](crate::RbTree::entries).
pub struct Entries<'a, K, V, C> {
    arena: &'a Arena<K, V>,
    comparator: &'a C,
    options: TraverseOptions<K>,
    /// Nodes whose start side is queued or done, each with the result of its
    /// end-bound test.
    stack: Vec<(Handle, bool)>,
    /// Subtree to descend into before the next pop.
    pending: Handle,
}

impl<'a, K, V, C> Entries<'a, K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    pub(crate) fn new(arena: &'a Arena<K, V>, comparator: &'a C, options: TraverseOptions<K>) -> Self {
        Self {
            arena,
            comparator,
            options,
            stack: Vec::new(),
            pending: arena.root(),
        }
    }

    fn above_low(&self, key: &K) -> bool {
        match &self.options.low {
            None => true,
            Some(low) => match (self.comparator)(key, low) {
                Ordering::Greater => true,
                Ordering::Equal => self.options.include_low,
                Ordering::Less => false,
            },
        }
    }

    fn below_high(&self, key: &K) -> bool {
        match &self.options.high {
            None => true,
            Some(high) => match (self.comparator)(key, high) {
                Ordering::Less => true,
                Ordering::Equal => self.options.include_high,
                Ordering::Greater => false,
            },
        }
    }

    /// Bound tested before descending toward the scan's starting end, and
    /// the bound tested before moving toward its finishing end.
    fn tests(&self, key: &K) -> (bool, bool) {
        if self.options.reverse {
            (self.below_high(key), self.above_low(key))
        } else {
            (self.above_low(key), self.below_high(key))
        }
    }

    fn start_dir(&self) -> Dir {
        if self.options.reverse {
            Dir::Right
        } else {
            Dir::Left
        }
    }

    fn descend(&mut self, mut h: Handle) {
        let arena = self.arena;
        let start_dir = self.start_dir();
        while !h.is_nil() {
            let node = arena.node(h);
            let (start, end) = self.tests(&node.key);
            if start {
                self.stack.push((h, end));
                h = node.child(start_dir);
            } else if end {
                h = node.child(start_dir.flip());
            } else {
                return;
            }
        }
    }
}

impl<'a, K, V, C> Iterator for Entries<'a, K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        loop {
            let pending = mem::replace(&mut self.pending, Handle::NIL);
            self.descend(pending);

            let (h, end) = self.stack.pop()?;
            if !end {
                // Every node still stacked lies further along and fails too.
                self.stack.clear();
                return None;
            }
            let node = arena.node(h);
            self.pending = node.child(self.start_dir().flip());
            if let Some(value) = &node.value {
                return Some((&node.key, value));
            }
        }
    }
}

impl<K, V, C> FusedIterator for Entries<'_, K, V, C> where C: Fn(&K, &K) -> Ordering {}

/// Keys of a scan. Created by [`RbTree::keys`](crate::RbTree::keys).
pub struct Keys<'a, K, V, C>(pub(crate) Entries<'a, K, V, C>);

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }
}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> where C: Fn(&K, &K) -> Ordering {}

/// Values of a scan. Created by [`RbTree::values`](crate::RbTree::values).
pub struct Values<'a, K, V, C>(pub(crate) Entries<'a, K, V, C>);

impl<'a, K, V, C> Iterator for Values<'a, K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }
}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> where C: Fn(&K, &K) -> Ordering {}
