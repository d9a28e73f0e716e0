//! # Router Module
//!
//! The compiled dispatch trie and its owner. The trie maps literal path
//! segments to child nodes, keeps at most one variable child per node, and
//! stores leaf lists keyed by method at terminal nodes.
//!
//! ## Matching rules
//!
//! - the walk consumes one segment per level; a literal child wins over
//!   the variable child, and the walk never backtracks;
//! - leaf lists accumulate, so several handlers may share a path and
//!   method - their filters disambiguate at request time;
//! - route-parameter values are extracted by positional index into the
//!   split request path, using the leaf's precomputed table.

mod core;
mod trie;

pub(crate) use core::split_path;
pub use core::{ParamVec, Router, MAX_INLINE_PARAMS};
pub use trie::{Leaf, TrieNode};
