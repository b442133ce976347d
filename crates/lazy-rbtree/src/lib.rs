//! Arena-backed red-black tree map with tombstone deletes.
//!
//! [`RbTree`] is an ordered map keyed by a caller-supplied total order. On
//! top of the usual point operations it supports:
//!
//! - **lazy deletes** that leave a tombstone in place and can be undone by
//!   re-inserting the key, next to **hard deletes** that unlink the node;
//! - **compaction** ([`RbTree::rebuild`]) that rebuilds the tree from its
//!   live entries only;
//! - **snapshots** ([`RbTree::copy`]) that share no node with the source;
//! - **bounded scans** in either direction ([`RbTree::entries`]) that prune
//!   subtrees outside the window.
//!
//! Nodes live in a slab and link to each other through `u32` handles. The
//! root hangs off a reserved anchor handle and empty leaves are a reserved
//! `NIL` handle, so no link is ever a reference.
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | `types` | handles, colors, directions, lookup slots |
//! | `node` | the occupied node record |
//! | `arena` | node storage, rotations, insertion and double-black fixups |
//! | [`iter`] | [`TraverseOptions`] and the pruning scan iterators |
//! | `tree` | [`RbTree`]: counters, tombstones, rebuild, copy |
//! | `validate` | invariant checker behind [`RbTree::validate`] |
//! | `print` | structural dump behind [`RbTree::dump`] |
//!
//! ```
//! use lazy_rbtree::{RbTree, TraverseOptions};
//!
//! let mut tree = RbTree::new();
//! for key in [10, 5, 20, 3, 7] {
//!     tree.insert(key, ());
//! }
//! tree.delete(&7, false);
//! assert_eq!((tree.size(), tree.total_size()), (4, 5));
//!
//! let window: Vec<_> = tree
//!     .keys(TraverseOptions::new().low(5).high(20).exclude_low())
//!     .collect();
//! assert_eq!(window, [&10, &20]);
//! ```

mod arena;
pub mod iter;
mod node;
mod print;
mod tree;
mod types;
mod validate;

pub use iter::{Entries, Keys, TraverseOptions, Values};
pub use tree::RbTree;
pub use validate::InvariantError;
