//! Best-first frontier and the global visited set.
//!
//! The frontier only holds `(key, node_id)` pairs; nodes themselves live in
//! the [`crate::node::NodeArena`]. The visited set is separate so that a
//! speculatively popped node can be returned to the frontier without
//! touching dedup state.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

use unravel_kernel::proof::hash::ContentHash;

use crate::node::{FrontierKey, NodeId};

/// `BinaryHeap` is a max-heap and `FrontierKey` sorts the best key first,
/// so entries wrap the key in `Reverse` to pop the best key.
#[derive(Debug, PartialEq, Eq)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    node_id: NodeId,
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Best-first frontier manager.
#[derive(Debug, Default)]
pub struct BestFirstFrontier {
    heap: BinaryHeap<FrontierEntry>,
    high_water: u64,
}

impl BestFirstFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node_id: NodeId, key: FrontierKey) {
        self.heap.push(FrontierEntry {
            key: Reverse(key),
            node_id,
        });
        let size = self.heap.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
    }

    /// Pop the best node.
    #[must_use]
    pub fn pop(&mut self) -> Option<(NodeId, FrontierKey)> {
        self.heap.pop().map(|e| (e.node_id, e.key.0))
    }

    /// Key of the best node without removing it.
    #[must_use]
    pub fn peek_key(&self) -> Option<FrontierKey> {
        self.heap.peek().map(|e| e.key.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// High-water mark of frontier size.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Prune frontier to at most `max_size` entries, keeping the best keys.
    ///
    /// Returns the ids of pruned nodes.
    pub fn prune_to(&mut self, max_size: usize) -> Vec<NodeId> {
        if self.heap.len() <= max_size {
            return Vec::new();
        }
        let mut entries: Vec<FrontierEntry> = self.heap.drain().collect();
        entries.sort_by(|a, b| a.key.0.cmp(&b.key.0));
        let pruned = entries[max_size..].iter().map(|e| e.node_id).collect();
        entries.truncate(max_size);
        self.heap = entries.into_iter().collect();
        pruned
    }
}

/// Result of [`VisitedSet::check_and_insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// First sighting, or a strictly shallower path than any before.
    New,
    /// Already seen at this depth or shallower.
    Duplicate { existing_depth: u32 },
}

/// Fingerprint to shallowest depth seen.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: BTreeMap<ContentHash, u32>,
}

impl VisitedSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `fingerprint` at `depth` unless an equal-or-shallower sighting exists.
    ///
    /// This is the only mutation of the set. Check and insert happen in one
    /// call so two equal values at the same depth can never both be `New`.
    pub fn check_and_insert(&mut self, fingerprint: &ContentHash, depth: u32) -> Visit {
        match self.seen.get_mut(fingerprint) {
            Some(existing) if *existing <= depth => Visit::Duplicate {
                existing_depth: *existing,
            },
            Some(existing) => {
                *existing = depth;
                Visit::New
            }
            None => {
                self.seen.insert(*fingerprint, depth);
                Visit::New
            }
        }
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &ContentHash) -> bool {
        self.seen.contains_key(fingerprint)
    }

    /// Shallowest depth recorded for `fingerprint`.
    #[must_use]
    pub fn depth_of(&self, fingerprint: &ContentHash) -> Option<u32> {
        self.seen.get(fingerprint).copied()
    }

    /// `true` once a strictly shallower path to `fingerprint` than `depth`
    /// has been recorded. A node at `depth` is then redundant.
    #[must_use]
    pub fn is_superseded(&self, fingerprint: &ContentHash, depth: u32) -> bool {
        self.depth_of(fingerprint).is_some_and(|shallowest| shallowest < depth)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
