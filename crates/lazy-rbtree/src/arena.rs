//! Node storage and the red-black rebalancer.
//!
//! The arena owns every occupied node in a [`Slab`]; spliced-out nodes give
//! their slot back for reuse. All structural algorithms work on [`Handle`]s:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`Arena::locate`] | descend by comparator to an occupied node or a vacant slot |
//! | [`Arena::activate`] | occupy a vacant slot, then run the insertion fixup |
//! | [`Arena::physical_delete`] | splice a node out, then run the double-black fixup |
//! | [`Arena::deep_copy`] | node-disjoint clone with identical topology and colors |
//!
//! Empty positions are the shared [`Handle::NIL`], which has no parent of its
//! own. The double-black fixup therefore tracks the deficient *position* as a
//! `(parent, dir)` pair instead of following the replacement node upward.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::mem;

use log::trace;
use slab::Slab;

use crate::node::Node;
use crate::types::{Color, Dir, Handle, Slot};

pub(crate) struct Arena<K, V> {
    nodes: Slab<Node<K, V>>,
    /// Left slot of the anchor.
    root: Handle,
}

impl<K, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Arena<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: Handle::NIL,
        }
    }

    #[inline]
    pub fn root(&self) -> Handle {
        self.root
    }

    /// Number of occupied nodes, live or tombstoned.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn node(&self, h: Handle) -> &Node<K, V> {
        &self.nodes[h.slot()]
    }

    #[inline]
    pub fn node_mut(&mut self, h: Handle) -> &mut Node<K, V> {
        &mut self.nodes[h.slot()]
    }

    /// The anchor is its own parent.
    #[inline]
    pub fn parent(&self, h: Handle) -> Handle {
        if h.is_anchor() {
            h
        } else {
            self.node(h).parent
        }
    }

    #[inline]
    pub fn child(&self, h: Handle, dir: Dir) -> Handle {
        if h.is_anchor() {
            return match dir {
                Dir::Left => self.root,
                Dir::Right => Handle::NIL,
            };
        }
        self.node(h).child(dir)
    }

    #[inline]
    fn set_child(&mut self, h: Handle, dir: Dir, child: Handle) {
        if h.is_anchor() {
            debug_assert_eq!(dir, Dir::Left, "anchor only has a left slot");
            self.root = child;
        } else {
            self.node_mut(h).set_child(dir, child);
        }
    }

    /// Puts `child` into `parent`'s `dir` slot and points it back at `parent`.
    #[inline]
    fn connect(&mut self, parent: Handle, dir: Dir, child: Handle) {
        self.set_child(parent, dir, child);
        if !child.is_nil() {
            self.node_mut(child).parent = parent;
        }
    }

    #[inline]
    pub fn color(&self, h: Handle) -> Color {
        if h.is_nil() || h.is_anchor() {
            Color::Black
        } else {
            self.node(h).color
        }
    }

    #[inline]
    fn set_color(&mut self, h: Handle, color: Color) {
        if h.is_nil() {
            debug_assert_eq!(color, Color::Black, "empty nodes are always black");
            return;
        }
        self.node_mut(h).color = color;
    }

    #[inline]
    fn is_red(&self, h: Handle) -> bool {
        self.color(h) == Color::Red
    }

    /// Side of its parent that `h` hangs on. `h` must not be `NIL`.
    #[inline]
    fn dir_of(&self, h: Handle) -> Dir {
        if self.child(self.parent(h), Dir::Left) == h {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    /// Outermost node of the subtree at `h` on the `dir` side.
    pub fn extreme(&self, mut h: Handle, dir: Dir) -> Handle {
        if h.is_nil() {
            return h;
        }
        loop {
            let next = self.node(h).child(dir);
            if next.is_nil() {
                return h;
            }
            h = next;
        }
    }

    pub fn locate<C>(&self, key: &K, comparator: &C) -> Slot
    where
        C: Fn(&K, &K) -> Ordering,
    {
        let mut parent = Handle::ANCHOR;
        let mut dir = Dir::Left;
        let mut curr = self.root;
        while !curr.is_nil() {
            let node = self.node(curr);
            dir = match comparator(key, &node.key) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => return Slot::Occupied(curr),
            };
            parent = curr;
            curr = node.child(dir);
        }
        Slot::Vacant { parent, dir }
    }

    /// Occupies the empty `dir` slot of `parent` with a live red node and
    /// restores the red-black invariants.
    pub fn activate(&mut self, parent: Handle, dir: Dir, key: K, value: V) -> Handle {
        debug_assert!(self.child(parent, dir).is_nil(), "slot is occupied");
        let n = Handle::from_slot(self.nodes.insert(Node::new(key, value, parent)));
        self.set_child(parent, dir, n);
        trace!("activated {n:?} under {parent:?} ({dir:?})");
        self.fix_red(n);
        n
    }

    fn fix_red(&mut self, mut n: Handle) {
        loop {
            let p = self.parent(n);
            if p.is_anchor() {
                self.set_color(n, Color::Black);
                trace!("insert fixup: {n:?} is the root");
                return;
            }
            if !self.is_red(p) {
                trace!("insert fixup: {n:?} has a black parent");
                return;
            }

            // A red parent is never the root, so the grandparent is a real node.
            let dir = self.dir_of(n);
            let parent_dir = self.dir_of(p);
            if dir != parent_dir {
                self.rotate(n);
                n = p;
                continue;
            }

            let g = self.parent(p);
            let uncle = self.child(g, dir.flip());
            if self.is_red(uncle) {
                self.set_color(uncle, Color::Black);
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                n = g;
                continue;
            }

            self.set_color(g, Color::Red);
            self.set_color(p, Color::Black);
            self.rotate(p);
            trace!("insert fixup: {p:?} rotated above {g:?}");
            return;
        }
    }

    /// Lifts `n` into its parent's place.
    ///
    /// `n`'s inner child moves across to the old parent, which becomes `n`'s
    /// child on the side facing away from where `n` used to hang.
    fn rotate(&mut self, n: Handle) {
        let p = self.parent(n);
        let g = self.parent(p);
        debug_assert!(!p.is_anchor(), "cannot rotate the root");
        let dir = self.dir_of(n);
        let opposite = dir.flip();
        let parent_dir = self.dir_of(p);
        let inner = self.node(n).child(opposite);

        trace!("rotate {n:?} above {p:?}");
        self.connect(g, parent_dir, n);
        self.connect(p, dir, inner);
        self.connect(n, opposite, p);
    }

    /// Removes the node at `n` from the structure and hands back the key and
    /// value it held.
    ///
    /// A node with two children trades payloads with its in-order successor
    /// and the successor's slot is the one released.
    pub fn physical_delete(&mut self, n: Handle) -> (K, Option<V>) {
        let mut target = n;
        let (left, right) = {
            let node = self.node(n);
            (node.left, node.right)
        };
        if !left.is_nil() && !right.is_nil() {
            let successor = self.extreme(right, Dir::Left);
            let (dst, src) = self
                .nodes
                .get2_mut(n.slot(), successor.slot())
                .expect("successor is a distinct occupied node");
            mem::swap(&mut dst.key, &mut src.key);
            mem::swap(&mut dst.value, &mut src.value);
            target = successor;
        }

        let (parent, replacement) = {
            let node = self.node(target);
            let replacement = if node.left.is_nil() {
                node.right
            } else {
                node.left
            };
            (node.parent, replacement)
        };
        let dir = self.dir_of(target);
        self.connect(parent, dir, replacement);

        let removed = self.nodes.remove(target.slot());
        trace!("spliced out {target:?}, {replacement:?} takes its place");
        if removed.color == Color::Black && !self.is_red(replacement) {
            self.fix_double_black(parent, dir);
        } else {
            self.set_color(replacement, Color::Black);
        }
        (removed.key, removed.value)
    }

    /// Restores black-height after the `dir` slot of `parent` lost a black
    /// node.
    fn fix_double_black(&mut self, mut parent: Handle, mut dir: Dir) {
        loop {
            if parent.is_anchor() {
                trace!("delete fixup: reached the root");
                return;
            }

            let opposite = dir.flip();
            let sibling = self.child(parent, opposite);
            debug_assert!(!sibling.is_nil(), "deficient position has no sibling");
            let near = self.child(sibling, dir);
            let far = self.child(sibling, opposite);

            if self.is_red(sibling) {
                self.set_color(sibling, Color::Black);
                self.set_color(parent, Color::Red);
                self.rotate(sibling);
                continue;
            }

            if self.is_red(far) {
                let parent_color = self.color(parent);
                self.set_color(far, Color::Black);
                self.set_color(sibling, parent_color);
                self.set_color(parent, Color::Black);
                self.rotate(sibling);
                trace!("delete fixup: far nephew {far:?} absorbed the deficit");
                return;
            }

            if self.is_red(near) {
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(near);
                continue;
            }

            self.set_color(sibling, Color::Red);
            if self.is_red(parent) {
                self.set_color(parent, Color::Black);
                trace!("delete fixup: red parent {parent:?} absorbed the deficit");
                return;
            }
            dir = self.dir_of(parent);
            parent = self.parent(parent);
        }
    }

    /// Occupied handles in breadth-first order, root first.
    pub fn breadth_first(&self) -> Vec<Handle> {
        let mut order = Vec::with_capacity(self.len());
        let mut queue = VecDeque::new();
        if !self.root.is_nil() {
            queue.push_back(self.root);
        }
        while let Some(h) = queue.pop_front() {
            let node = self.node(h);
            for child in [node.left, node.right] {
                if !child.is_nil() {
                    queue.push_back(child);
                }
            }
            order.push(h);
        }
        order
    }

    /// Dismantles the arena, yielding every occupied payload in
    /// breadth-first order.
    pub fn into_breadth_first(mut self) -> impl Iterator<Item = (K, Option<V>)> {
        let order = self.breadth_first();
        order.into_iter().map(move |h| {
            let node = self.nodes.remove(h.slot());
            (node.key, node.value)
        })
    }
}

impl<K: Clone, V: Clone> Arena<K, V> {
    pub fn deep_copy(&self) -> Self {
        let mut out = Self {
            nodes: Slab::with_capacity(self.len()),
            root: Handle::NIL,
        };
        if self.root.is_nil() {
            return out;
        }

        out.root = out.clone_node(self.node(self.root), Handle::ANCHOR);
        let mut stack = vec![(self.root, out.root)];
        while let Some((src, dst)) = stack.pop() {
            for dir in [Dir::Left, Dir::Right] {
                let child = self.node(src).child(dir);
                if child.is_nil() {
                    continue;
                }
                let copied = out.clone_node(self.node(child), dst);
                out.node_mut(dst).set_child(dir, copied);
                stack.push((child, copied));
            }
        }
        out
    }

    fn clone_node(&mut self, src: &Node<K, V>, parent: Handle) -> Handle {
        Handle::from_slot(self.nodes.insert(Node {
            key: src.key.clone(),
            value: src.value.clone(),
            color: src.color,
            left: Handle::NIL,
            right: Handle::NIL,
            parent,
        }))
    }
}
