//! Ordered containers backed by a red black tree.
//!
//! `OrderedTree<T>` keeps a sorted collection of keys that may contain duplicates and
//! `RedBlackMap<T, U>` maps unique keys to values. Both support insertion, removal, lookup,
//! minimum and maximum, strict successor and predecessor queries for keys that may or may not
//! be present, and in-order iteration.
//!
//! The library emits `trace` records through the `log` facade for every rebalancing step. It
//! never installs a logger itself.

pub mod arena;
pub mod config;
pub mod error;
pub mod red_black_tree;
