//! Structural self-check.

use std::cmp::Ordering;

use thiserror::Error;

use crate::arena::Arena;
use crate::types::{Color, Handle};

/// A violated tree invariant, as reported by [`RbTree::validate`].
///
/// Node numbers are arena slot indices and only meaningful together with a
/// [`RbTree::dump`] of the same state.
///
/// [`RbTree::validate`]: crate::RbTree::validate
/// [`RbTree::dump`]: crate::RbTree::dump
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("node {0} does not point back at its parent")]
    BrokenParentLink(u32),
    #[error("root is red")]
    RedRoot,
    #[error("red node {0} has a red child")]
    RedRed(u32),
    #[error("black height mismatch under node {node}: left {left}, right {right}")]
    BlackHeight { node: u32, left: usize, right: usize },
    #[error("node {0} is not strictly after its in-order predecessor")]
    Order(u32),
    #[error("{counter} is {actual} but the tree holds {expected}")]
    Counter {
        counter: &'static str,
        actual: usize,
        expected: usize,
    },
}

/// Node counts gathered while checking.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Census {
    pub live: usize,
    pub occupied: usize,
}

impl<K, V> Arena<K, V> {
    /// Verifies parent links, coloring, black-height and strict key order.
    pub fn check<C>(&self, comparator: &C) -> Result<Census, InvariantError>
    where
        C: Fn(&K, &K) -> Ordering,
    {
        let root = self.root();
        if root.is_nil() {
            return Ok(Census::default());
        }
        if self.parent(root) != Handle::ANCHOR {
            return Err(InvariantError::BrokenParentLink(root.index()));
        }
        if self.color(root) == Color::Red {
            return Err(InvariantError::RedRoot);
        }

        self.black_height(root)?;

        let mut census = Census::default();
        let mut prev: Option<Handle> = None;
        let mut stack = Vec::new();
        let mut curr = root;
        while !curr.is_nil() || !stack.is_empty() {
            while !curr.is_nil() {
                stack.push(curr);
                curr = self.node(curr).left;
            }
            let Some(h) = stack.pop() else { break };
            let node = self.node(h);
            if let Some(p) = prev {
                if comparator(&self.node(p).key, &node.key) != Ordering::Less {
                    return Err(InvariantError::Order(h.index()));
                }
            }
            census.occupied += 1;
            if node.is_live() {
                census.live += 1;
            }
            prev = Some(h);
            curr = node.right;
        }

        if census.occupied != self.len() {
            return Err(InvariantError::Counter {
                counter: "arena length",
                actual: self.len(),
                expected: census.occupied,
            });
        }
        Ok(census)
    }

    fn black_height(&self, h: Handle) -> Result<usize, InvariantError> {
        if h.is_nil() {
            return Ok(1);
        }
        let node = self.node(h);
        for child in [node.left, node.right] {
            if child.is_nil() {
                continue;
            }
            if self.parent(child) != h {
                return Err(InvariantError::BrokenParentLink(child.index()));
            }
            if node.color == Color::Red && self.color(child) == Color::Red {
                return Err(InvariantError::RedRed(h.index()));
            }
        }

        let left = self.black_height(node.left)?;
        let right = self.black_height(node.right)?;
        if left != right {
            return Err(InvariantError::BlackHeight {
                node: h.index(),
                left,
                right,
            });
        }
        Ok(left + usize::from(node.color == Color::Black))
    }
}
