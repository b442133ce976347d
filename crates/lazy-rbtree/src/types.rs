//! Handles, colors and directions shared by the arena and the tree.
//!
//! Nodes never hold references to each other. Every link is a [`Handle`]
//! into the owning arena, and two reserved handle values replace the
//! placeholder objects a pointer-based tree would allocate:
//!
//! - [`Handle::NIL`] is every empty leaf position. It reads as black and has
//!   no children.
//! - [`Handle::ANCHOR`] sits above the root. Its left slot *is* the root and
//!   it is its own parent, so rotations can rewrite "the parent's child slot"
//!   without special-casing the top of the tree.

use std::fmt;

/// Stable index of a node slot in the arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle(u32);

impl Handle {
    pub const NIL: Handle = Handle(u32::MAX);
    pub const ANCHOR: Handle = Handle(u32::MAX - 1);

    /// Largest number of nodes an arena can hold; the top two `u32` values
    /// are reserved.
    pub const CAPACITY: usize = Self::ANCHOR.0 as usize;

    /// # Panics
    ///
    /// If `slot` would collide with a reserved handle.
    #[inline]
    pub fn from_slot(slot: usize) -> Self {
        assert!(slot < Self::CAPACITY, "arena slot {slot} exceeds handle capacity");
        Handle(slot as u32)
    }

    #[inline]
    pub fn slot(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }

    #[inline]
    pub fn is_anchor(self) -> bool {
        self == Self::ANCHOR
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NIL => f.write_str("NIL"),
            Self::ANCHOR => f.write_str("ANCHOR"),
            Handle(i) => write!(f, "#{i}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// Result of descending the tree for a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The key is stored in this node, live or tombstoned.
    Occupied(Handle),
    /// The key is absent; it belongs in `parent`'s empty `dir` child.
    Vacant { parent: Handle, dir: Dir },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_slot_below_reserved_handles() {
        let last = Handle::from_slot(Handle::CAPACITY - 1);
        assert!(!last.is_nil() && !last.is_anchor());
        assert_eq!(format!("{last:?}"), format!("#{}", u32::MAX - 2));
    }

    #[test]
    #[should_panic(expected = "exceeds handle capacity")]
    fn slot_aliasing_anchor_is_rejected() {
        Handle::from_slot(Handle::CAPACITY);
    }

    #[test]
    #[should_panic(expected = "exceeds handle capacity")]
    fn slot_aliasing_nil_is_rejected() {
        Handle::from_slot(u32::MAX as usize);
    }
}
