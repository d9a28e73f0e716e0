//! Router core - compiled trie owner, hot path for the segment walk.

use smallvec::SmallVec;
use std::sync::Arc;
use tracing::info;

use super::trie::TrieNode;
use crate::analyzer::AnalyzedHandler;
use crate::dispatcher::compile_leaf;
use crate::error::CompileError;

/// Maximum number of route parameters before heap allocation.
/// Most REST-style routes carry ≤4 path variables.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated route-parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the static leaf
/// tables; values are per-request data extracted from the URL and stay
/// `String`.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Split a request path into non-empty segments.
#[must_use]
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// The compiled dispatch trie together with its endpoint table.
///
/// Exclusively owned by the dispatcher instance that wraps it; nothing
/// mutates it after compilation, so unsynchronized concurrent reads are
/// safe.
#[derive(Clone)]
pub struct Router {
    root: TrieNode,
    /// Endpoint names in normalized table order, for diagnostics.
    endpoints: Vec<String>,
}

impl Router {
    /// Build the trie from analyzed entries.
    ///
    /// Each entry's handler is composed here (argument resolution,
    /// adaptation, middleware, context, diagnostics) and stored in a leaf
    /// appended under the entry's method key.
    pub fn compile(analyzed: Vec<AnalyzedHandler>) -> Result<Self, CompileError> {
        let mut root = TrieNode::default();
        let mut endpoints = Vec::with_capacity(analyzed.len());
        for entry in &analyzed {
            let leaf = compile_leaf(entry)?;
            root.insert(&entry.spec.path, entry.spec.method.clone(), leaf);
            endpoints.push(entry.endpoint.clone());
        }
        info!(routes = endpoints.len(), "dispatch trie compiled");
        Ok(Self { root, endpoints })
    }

    /// Walk the trie by path segments. `None` means no structural match.
    #[must_use]
    pub fn walk(&self, segments: &[&str]) -> Option<&TrieNode> {
        self.root.walk(segments)
    }

    /// Endpoint names in normalized (sorted) table order.
    #[must_use]
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Print all registered endpoints to stdout.
    ///
    /// Useful for debugging and verifying that the table normalized the
    /// way it was meant to; the order is the normalizer's deterministic
    /// sort order.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.endpoints.len());
        for endpoint in &self.endpoints {
            println!("[route] {endpoint}");
        }
    }
}
