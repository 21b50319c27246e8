//! Search nodes, the node arena, and the frontier ordering key.
//!
//! Nodes live in a [`NodeArena`] addressed by [`NodeId`]. Each node stores
//! its parent's id and the single step that produced it, so spawning a
//! child is O(1) in path length and siblings share their common prefix.
//! The full path is only materialized on acceptance.

use unravel_kernel::carrier::value::Value;
use unravel_kernel::proof::hash::ContentHash;

use crate::result::DecodeStep;

/// Index into a [`NodeArena`]. The root is always `0`.
pub type NodeId = usize;

/// How a node was produced from its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOrigin {
    /// Name of the cracker that produced the node.
    pub operation: String,
    pub confidence: Option<f64>,
    pub key_info: Option<String>,
}

/// An immutable node in the search tree.
///
/// Ordering for frontier extraction uses `(priority, depth, creation_order)`:
/// higher priority first, ties broken by shallower depth, then older
/// creation order.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub node_id: NodeId,
    /// Parent node ID (`None` for root).
    pub parent_id: Option<NodeId>,
    pub value: Value,
    /// Fingerprint of `value` (visited-set key).
    pub fingerprint: ContentHash,
    /// Path length from the ciphertext (root = 0).
    pub depth: u32,
    /// Combined checker priority (parts per million, see [`crate::scorer`]).
    pub priority: i64,
    /// Global counter for deterministic tie-breaking.
    pub creation_order: u64,
    /// `None` for root.
    pub origin: Option<StepOrigin>,
}

/// Append-only node storage.
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, assigning its id. Returns the id.
    pub fn push(&mut self, mut node: SearchNode) -> NodeId {
        let id = self.nodes.len();
        node.node_id = id;
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate from `id` up to the root (inclusive on both ends).
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: Some(id),
        }
    }

    /// Whether `fingerprint` appears on the path from the root to `id`.
    #[must_use]
    pub fn path_contains(&self, id: NodeId, fingerprint: &ContentHash) -> bool {
        self.ancestors(id).any(|n| &n.fingerprint == fingerprint)
    }

    /// Materialize the decode steps from the root to `id`, in application order.
    #[must_use]
    pub fn materialize_path(&self, id: NodeId) -> Vec<DecodeStep> {
        let mut steps: Vec<DecodeStep> = self
            .ancestors(id)
            .filter_map(|node| {
                let origin = node.origin.as_ref()?;
                let parent = self.get(node.parent_id?)?;
                Some(DecodeStep {
                    operation: origin.operation.clone(),
                    input: parent.value.clone(),
                    output: node.value.clone(),
                    confidence: origin.confidence,
                    key_info: origin.key_info.clone(),
                })
            })
            .collect();
        steps.reverse();
        steps
    }
}

/// Iterator returned by [`NodeArena::ancestors`].
pub struct Ancestors<'a> {
    arena: &'a NodeArena,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a SearchNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.get(self.next?)?;
        self.next = node.parent_id;
        Some(node)
    }
}

/// The frontier ordering key: `(priority, depth, creation_order)`.
///
/// `Ord` sorts the *best* key first: higher priority, then shallower
/// depth, then older `creation_order`. `creation_order` is unique, so
/// the order is total and no two frontier entries compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierKey {
    pub priority: i64,
    pub depth: u32,
    pub creation_order: u64,
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then(self.depth.cmp(&other.depth))
            .then(self.creation_order.cmp(&other.creation_order))
    }
}

impl From<&SearchNode> for FrontierKey {
    fn from(node: &SearchNode) -> Self {
        Self {
            priority: node.priority,
            depth: node.depth,
            creation_order: node.creation_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(parent: Option<NodeId>, value: &str, depth: u32, op: Option<&str>) -> SearchNode {
        let value = Value::from(value);
        SearchNode {
            node_id: 0,
            parent_id: parent,
            fingerprint: value.fingerprint(),
            value,
            depth,
            priority: 0,
            creation_order: 0,
            origin: op.map(|o| StepOrigin {
                operation: o.to_string(),
                confidence: None,
                key_info: None,
            }),
        }
    }

    #[test]
    fn frontier_key_higher_priority_wins() {
        let a = FrontierKey {
            priority: 10,
            depth: 5,
            creation_order: 10,
        };
        let b = FrontierKey {
            priority: 2,
            depth: 1,
            creation_order: 1,
        };
        assert!(a < b, "higher priority should sort first");
    }

    #[test]
    fn frontier_key_ties_broken_by_depth_then_creation_order() {
        let a = FrontierKey {
            priority: 1,
            depth: 2,
            creation_order: 5,
        };
        let b = FrontierKey {
            priority: 1,
            depth: 3,
            creation_order: 1,
        };
        assert!(a < b, "shallower depth should sort first on priority tie");

        let c = FrontierKey {
            priority: 1,
            depth: 2,
            creation_order: 3,
        };
        assert!(c < a, "older creation_order should sort first on full tie");
    }

    #[test]
    fn arena_assigns_sequential_ids() {
        let mut arena = NodeArena::new();
        assert_eq!(arena.push(node(None, "root", 0, None)), 0);
        assert_eq!(arena.push(node(Some(0), "child", 1, Some("a"))), 1);
        assert_eq!(arena.get(1).unwrap().node_id, 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn materialized_path_is_in_application_order() {
        let mut arena = NodeArena::new();
        let root = arena.push(node(None, "c", 0, None));
        let mid = arena.push(node(Some(root), "b", 1, Some("first")));
        let leaf = arena.push(node(Some(mid), "a", 2, Some("second")));
        // A sibling branch must not leak into the path.
        arena.push(node(Some(root), "x", 1, Some("other")));

        let path = arena.materialize_path(leaf);
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].operation, "first");
        assert_eq!(path[0].input, Value::from("c"));
        assert_eq!(path[0].output, Value::from("b"));
        assert_eq!(path[1].operation, "second");
        assert_eq!(path[1].input, path[0].output);
        assert_eq!(path[1].output, Value::from("a"));
        assert!(arena.materialize_path(root).is_empty());
    }

    #[test]
    fn path_contains_only_checks_own_ancestors() {
        let mut arena = NodeArena::new();
        let root = arena.push(node(None, "r", 0, None));
        let a = arena.push(node(Some(root), "a", 1, Some("op")));
        let b = arena.push(node(Some(root), "b", 1, Some("op")));
        assert!(arena.path_contains(a, &Value::from("r").fingerprint()));
        assert!(arena.path_contains(a, &Value::from("a").fingerprint()));
        assert!(!arena.path_contains(a, &Value::from("b").fingerprint()));
        assert!(arena.path_contains(b, &Value::from("b").fingerprint()));
    }
}
