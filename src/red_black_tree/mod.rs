//! Self-balancing binary search tree that uses a color bit to ensure that the tree remains
//! approximately balanced during insertions and deletions.
//!
//! Nodes are stored in a `TypedArena` and link to their children and parent through arena
//! handles, so the classic parent-pointer algorithms run without any unsafe code.

mod map;
mod node;
mod ordered_tree;
mod tree;

pub use self::map::{RedBlackMap, RedBlackMapIntoIter, RedBlackMapIter};
pub use self::ordered_tree::{OrderedTree, OrderedTreeIntoIter, OrderedTreeIter};
