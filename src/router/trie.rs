//! Dispatch trie: the compiled, immutable nested-node structure walked
//! segment by segment at request time.
//!
//! Each node owns a literal-child map, at most one variable child, and the
//! leaf lists keyed by method. Leaf lists accumulate - several handlers
//! may share a path and method and are told apart by their filters during
//! leaf selection, never at insert time.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatcher::{BoxedHandler, HandlerRequest, RequestFilter};
use crate::spec::{MethodKey, PathSegment};

/// Terminal trie record: the compiled handler plus everything needed to
/// select it and bind its route parameters. Built once at compile time and
/// shared read-only across all requests.
#[derive(Clone)]
pub struct Leaf {
    pub handler: BoxedHandler,
    /// Human-readable endpoint name, e.g. `GET /widgets/{id}`.
    pub endpoint: String,
    pub filter: Option<RequestFilter>,
    /// Route-param name → zero-based index into the split request path.
    pub param_table: Vec<(Arc<str>, usize)>,
}

impl Leaf {
    /// Whether this leaf's filter accepts the request. Leaves without a
    /// filter accept everything.
    #[inline]
    #[must_use]
    pub fn accepts(&self, req: &HandlerRequest) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(req))
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("endpoint", &self.endpoint)
            .field("filtered", &self.filter.is_some())
            .field("param_table", &self.param_table)
            .finish()
    }
}

/// One node of the dispatch trie.
#[derive(Clone, Default)]
pub struct TrieNode {
    children: HashMap<String, TrieNode>,
    variable: Option<Box<TrieNode>>,
    leaves: HashMap<MethodKey, Vec<Leaf>>,
}

impl TrieNode {
    /// Descend/create nodes along the segment sequence and append the leaf
    /// at the terminal node. Existing leaves are never overwritten.
    pub(crate) fn insert(&mut self, segments: &[PathSegment], method: MethodKey, leaf: Leaf) {
        match segments.split_first() {
            None => self.leaves.entry(method).or_default().push(leaf),
            Some((PathSegment::Literal(s), rest)) => self
                .children
                .entry(s.clone())
                .or_default()
                .insert(rest, method, leaf),
            Some((PathSegment::Variable(_), rest)) => self
                .variable
                .get_or_insert_with(Default::default)
                .insert(rest, method, leaf),
        }
    }

    /// Consume path segments one at a time: a matching literal child wins
    /// over the variable child, and there is no backtracking - if the
    /// chosen branch dead-ends the walk fails even when the other branch
    /// would have matched.
    pub(crate) fn walk(&self, segments: &[&str]) -> Option<&TrieNode> {
        let mut node = self;
        for segment in segments {
            node = if let Some(child) = node.children.get(*segment) {
                child
            } else if let Some(variable) = &node.variable {
                variable
            } else {
                return None;
            };
        }
        Some(node)
    }

    /// Candidate leaves registered under the given method key.
    #[must_use]
    pub fn leaves_for(&self, key: &MethodKey) -> &[Leaf] {
        self.leaves.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::parse_path;
    use http::Method;

    fn leaf(endpoint: &str) -> Leaf {
        Leaf {
            handler: Arc::new(|_req| {}),
            endpoint: endpoint.to_string(),
            filter: None,
            param_table: Vec::new(),
        }
    }

    fn get() -> MethodKey {
        MethodKey::Method(Method::GET)
    }

    #[test]
    fn test_insert_and_walk_literal() {
        let mut root = TrieNode::default();
        root.insert(&parse_path("/health").unwrap(), get(), leaf("GET /health"));

        let node = root.walk(&["health"]).unwrap();
        assert_eq!(node.leaves_for(&get()).len(), 1);
        assert!(root.walk(&["nope"]).is_none());
    }

    #[test]
    fn test_variable_child_matches_any_segment() {
        let mut root = TrieNode::default();
        root.insert(
            &parse_path("/users/{id}").unwrap(),
            get(),
            leaf("GET /users/{id}"),
        );

        assert!(root.walk(&["users", "123"]).is_some());
        assert!(root.walk(&["users", "abc"]).is_some());
        assert!(root.walk(&["users"]).unwrap().leaves_for(&get()).is_empty());
    }

    #[test]
    fn test_literal_wins_over_variable() {
        let mut root = TrieNode::default();
        root.insert(&parse_path("/w/{id}").unwrap(), get(), leaf("GET /w/{id}"));
        root.insert(&parse_path("/w/all").unwrap(), get(), leaf("GET /w/all"));

        let node = root.walk(&["w", "all"]).unwrap();
        assert_eq!(node.leaves_for(&get())[0].endpoint, "GET /w/all");

        let node = root.walk(&["w", "42"]).unwrap();
        assert_eq!(node.leaves_for(&get())[0].endpoint, "GET /w/{id}");
    }

    #[test]
    fn test_no_backtracking_after_literal_descend() {
        // /a/b dead-ends at depth 2 for a 3-segment request even though
        // /a/{x}/c would structurally match.
        let mut root = TrieNode::default();
        root.insert(&parse_path("/a/{x}/c").unwrap(), get(), leaf("GET /a/{x}/c"));
        root.insert(&parse_path("/a/b").unwrap(), get(), leaf("GET /a/b"));

        assert!(root.walk(&["a", "b", "c"]).is_none());
        assert!(root.walk(&["a", "z", "c"]).is_some());
    }

    #[test]
    fn test_leaf_lists_accumulate() {
        let mut root = TrieNode::default();
        root.insert(&parse_path("/w").unwrap(), get(), leaf("first"));
        root.insert(&parse_path("/w").unwrap(), get(), leaf("second"));

        let node = root.walk(&["w"]).unwrap();
        let leaves = node.leaves_for(&get());
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].endpoint, "first");
        assert_eq!(leaves[1].endpoint, "second");
    }

    #[test]
    fn test_any_method_leaves_separate_key() {
        let mut root = TrieNode::default();
        root.insert(&parse_path("/w").unwrap(), MethodKey::Any, leaf("* /w"));

        let node = root.walk(&["w"]).unwrap();
        assert!(node.leaves_for(&get()).is_empty());
        assert_eq!(node.leaves_for(&MethodKey::Any).len(), 1);
    }
}
