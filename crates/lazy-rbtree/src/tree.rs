use std::cmp::Ordering;
use std::fmt;

use log::debug;

use crate::arena::Arena;
use crate::iter::{Entries, Keys, TraverseOptions, Values};
use crate::print::print;
use crate::types::Slot;
use crate::validate::InvariantError;

fn natural_order<K: Ord>(a: &K, b: &K) -> Ordering {
    a.cmp(b)
}

/// Ordered map on a red-black tree, with tombstone deletes.
///
/// Two counters are kept: [`size`](Self::size) counts live keys and
/// [`total_size`](Self::total_size) counts every occupied node, including
/// tombstones left behind by lazy deletes. [`rebuild`](Self::rebuild)
/// compacts the tombstones away.
///
/// # Ordering
///
/// Keys are ordered by a three-way comparator `C`. It must be a total order
/// (consistent, antisymmetric, transitive) and must not change while the
/// tree is alive. Breaking this does not cause memory unsafety but leaves
/// lookups and scans unspecified. Keys that compare `Equal` address the
/// same entry.
///
/// # Capacity
///
/// Nodes are addressed by `u32` handles with two values reserved, so a tree
/// holds at most `u32::MAX - 1` occupied nodes (live plus tombstones).
/// Inserting past that panics.
pub struct RbTree<K, V, C = fn(&K, &K) -> Ordering> {
    arena: Arena<K, V>,
    size: usize,
    total_size: usize,
    comparator: C,
}

impl<K, V> RbTree<K, V>
where
    K: Ord,
{
    pub fn new() -> Self {
        Self::with_comparator(natural_order::<K>)
    }
}

impl<K, V> Default for RbTree<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RbTree<K, V> {
    /// A tree ordered by a projection of each key.
    ///
    /// `priority(a).cmp(&priority(b))` is the induced comparator, so keys
    /// with equal priority address the same entry. Use a totally ordered
    /// priority type; wrap floats before projecting to them.
    pub fn with_priority<P, F>(priority: F) -> RbTree<K, V, impl Fn(&K, &K) -> Ordering + Clone>
    where
        P: Ord,
        F: Fn(&K) -> P + Clone,
    {
        RbTree::with_comparator(move |a: &K, b: &K| priority(a).cmp(&priority(b)))
    }
}

impl<K, V, C> RbTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            arena: Arena::new(),
            size: 0,
            total_size: 0,
            comparator,
        }
    }

    /// Number of live keys.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of occupied nodes, live or tombstoned.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Number of tombstones awaiting a hard delete or a rebuild.
    pub fn tombstones(&self) -> usize {
        self.total_size - self.size
    }

    /// `true` when no key is live. Tombstones may still occupy nodes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn has(&self, key: &K) -> bool {
        match self.arena.locate(key, &self.comparator) {
            Slot::Occupied(h) => self.arena.node(h).is_live(),
            Slot::Vacant { .. } => false,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        match self.arena.locate(key, &self.comparator) {
            Slot::Occupied(h) => self.arena.node(h).value.as_ref(),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.arena.locate(key, &self.comparator) {
            Slot::Occupied(h) => self.arena.node_mut(h).value.as_mut(),
            Slot::Vacant { .. } => None,
        }
    }

    /// Stores `value` under `key`.
    ///
    /// A live entry is overwritten in place and a tombstone is brought back
    /// to life; neither changes the structure. In both cases the stored key
    /// is replaced by `key`. Returns `true` only when a new node had to be
    /// added.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.arena.locate(&key, &self.comparator) {
            Slot::Occupied(h) => {
                let node = self.arena.node_mut(h);
                node.key = key;
                if node.value.replace(value).is_none() {
                    self.size += 1;
                }
                false
            }
            Slot::Vacant { parent, dir } => {
                self.arena.activate(parent, dir, key, value);
                self.size += 1;
                self.total_size += 1;
                true
            }
        }
    }

    /// Deletes `key`.
    ///
    /// A lazy delete (`hard == false`) drops the value and leaves a
    /// tombstone in place; it reports `false` when the key was already dead.
    /// A hard delete unlinks the node whether or not it is live. Returns
    /// `true` iff something changed.
    pub fn delete(&mut self, key: &K, hard: bool) -> bool {
        let Slot::Occupied(h) = self.arena.locate(key, &self.comparator) else {
            return false;
        };

        if !hard {
            return match self.arena.node_mut(h).value.take() {
                Some(_) => {
                    self.size -= 1;
                    true
                }
                None => false,
            };
        }

        let (_, value) = self.arena.physical_delete(h);
        self.total_size -= 1;
        if value.is_some() {
            self.size -= 1;
        }
        true
    }

    /// Drops every node, live or not.
    pub fn clear(&mut self) {
        debug!("clearing tree of {} nodes", self.total_size);
        self.arena = Arena::new();
        self.size = 0;
        self.total_size = 0;
    }

    /// Rebuilds the tree from its live entries only, in place.
    ///
    /// Occupied nodes are visited breadth-first and each live entry is
    /// inserted into a fresh structure. Afterwards `total_size == size`.
    pub fn rebuild(&mut self) -> &mut Self {
        let before = self.total_size;
        let old = std::mem::take(&mut self.arena);
        self.size = 0;
        self.total_size = 0;
        for (key, value) in old.into_breadth_first() {
            if let Some(value) = value {
                self.insert(key, value);
            }
        }
        debug!(
            "rebuilt tree: {} live entries kept, {} tombstones dropped",
            self.size,
            before - self.size
        );
        self
    }

    /// Scans live entries in key order.
    pub fn entries(&self, options: TraverseOptions<K>) -> Entries<'_, K, V, C> {
        Entries::new(&self.arena, &self.comparator, options)
    }

    pub fn keys(&self, options: TraverseOptions<K>) -> Keys<'_, K, V, C> {
        Keys(self.entries(options))
    }

    pub fn values(&self, options: TraverseOptions<K>) -> Values<'_, K, V, C> {
        Values(self.entries(options))
    }

    /// Ascending scan over every live entry.
    pub fn iter(&self) -> Entries<'_, K, V, C> {
        self.entries(TraverseOptions::default())
    }

    /// Smallest live entry.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Largest live entry.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.entries(TraverseOptions::new().reverse()).next()
    }

    /// Checks every structural invariant and both counters.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let census = self.arena.check(&self.comparator)?;
        if census.occupied != self.total_size {
            return Err(InvariantError::Counter {
                counter: "total_size",
                actual: self.total_size,
                expected: census.occupied,
            });
        }
        if census.live != self.size {
            return Err(InvariantError::Counter {
                counter: "size",
                actual: self.size,
                expected: census.live,
            });
        }
        Ok(())
    }
}

impl<K, V, C> RbTree<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> Ordering + Clone,
{
    /// Deep copy sharing no node with `self`: same keys, values, colors,
    /// tombstones and shape.
    pub fn copy(&self) -> Self {
        debug!("copying tree of {} nodes", self.total_size);
        Self {
            arena: self.arena.deep_copy(),
            size: self.size,
            total_size: self.total_size,
            comparator: self.comparator.clone(),
        }
    }

    /// Like [`rebuild`](Self::rebuild), but leaves `self` untouched and
    /// returns the compacted tree.
    pub fn rebuilt(&self) -> Self {
        let mut tree = Self::with_comparator(self.comparator.clone());
        for h in self.arena.breadth_first() {
            let node = self.arena.node(h);
            if let Some(value) = &node.value {
                tree.insert(node.key.clone(), value.clone());
            }
        }
        debug!(
            "rebuilt copy: {} live entries of {} nodes",
            tree.size, self.total_size
        );
        tree
    }
}

impl<K, V, C> RbTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    /// Indented dump of the node graph with colors and tombstones.
    pub fn dump(&self) -> String {
        print(&self.arena, self.arena.root(), "")
    }
}

impl<K, V, C> Clone for RbTree<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> Ordering + Clone,
{
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<K, V, C> fmt::Debug for RbTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Fn(&K, &K) -> Ordering,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> Extend<(K, V)> for RbTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for RbTree<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tree: &RbTree<i32, ()>) -> Vec<i32> {
        tree.keys(TraverseOptions::default()).copied().collect()
    }

    #[test]
    fn tombstone_lifecycle_walkthrough() {
        let mut tree = RbTree::new();
        for key in [10, 5, 20, 3, 7] {
            assert!(tree.insert(key, ()));
        }
        assert_eq!(keys(&tree), [3, 5, 7, 10, 20]);

        assert!(tree.delete(&7, false));
        assert!(!tree.has(&7));
        assert_eq!((tree.size(), tree.total_size()), (4, 5));
        assert_eq!(keys(&tree), [3, 5, 10, 20]);

        assert!(!tree.insert(7, ()));
        assert_eq!((tree.size(), tree.total_size()), (5, 5));
        assert_eq!(keys(&tree), [3, 5, 7, 10, 20]);

        assert!(tree.delete(&5, true));
        assert_eq!((tree.size(), tree.total_size()), (4, 4));

        tree.rebuild();
        assert_eq!((tree.size(), tree.total_size()), (4, 4));
        assert_eq!(keys(&tree), [3, 7, 10, 20]);

        let window: Vec<i32> = tree
            .keys(TraverseOptions::new().low(7).high(20).exclude_low())
            .copied()
            .collect();
        assert_eq!(window, [10, 20]);
        tree.validate().unwrap();
    }

    #[test]
    fn lazy_delete_twice_reports_no_change() {
        let mut tree: RbTree<i32, &str> = RbTree::new();
        tree.insert(1, "one");
        assert!(tree.delete(&1, false));
        assert!(!tree.delete(&1, false));
        assert_eq!(tree.get(&1), None);
        assert_eq!(tree.tombstones(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn hard_delete_of_tombstone_only_drops_total() {
        let mut tree: RbTree<i32, i32> = RbTree::new();
        tree.insert(1, 10);
        tree.insert(2, 20);
        tree.delete(&1, false);
        assert!(tree.delete(&1, true));
        assert_eq!((tree.size(), tree.total_size()), (1, 1));
        assert!(!tree.delete(&1, true));
        tree.validate().unwrap();
    }

    #[test]
    fn validate_catches_counter_drift() {
        let mut tree: RbTree<i32, i32> = RbTree::new();
        tree.insert(1, 1);
        tree.size = 2;
        assert_eq!(
            tree.validate(),
            Err(InvariantError::Counter {
                counter: "size",
                actual: 2,
                expected: 1
            })
        );
    }

    #[test]
    fn dump_marks_tombstones() {
        let mut tree: RbTree<i32, i32> = RbTree::new();
        tree.insert(1, 10);
        tree.insert(2, 20);
        tree.delete(&2, false);
        let dump = tree.dump();
        assert!(dump.contains("1 = 10"));
        assert!(dump.contains("2 †"));
        assert!(dump.contains("black"));
        assert!(dump.contains("red"));
    }
}
