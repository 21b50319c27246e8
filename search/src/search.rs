//! Search entry point and the best-first expansion loop.
//!
//! Each loop iteration pops up to `workers` nodes, expands them in
//! parallel, then commits the expansions one by one in pop order. Before
//! committing anything but the first node of a batch, the loop checks
//! whether the frontier now holds a better node (a child committed
//! earlier in the same batch). If so, the uncommitted remainder goes back
//! to the frontier with its expansions cached. Commits therefore happen
//! in exactly the order a single worker would produce, and the result,
//! stats and path are identical for any worker count.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info};
use unravel_kernel::carrier::value::Value;

use crate::contract::{PluginSet, Searcher};
use crate::control::SearchControl;
use crate::error::SearchError;
use crate::frontier::{BestFirstFrontier, Visit, VisitedSet};
use crate::node::{FrontierKey, NodeArena, NodeId, SearchNode, StepOrigin};
use crate::policy::SearchPolicy;
use crate::progress::{notify, ProgressEvent};
use crate::result::{
    CancelReason, ExhaustionReason, SearchOutcome, SearchReport, SearchResultV1, SearchStatsV1,
};
use crate::scorer::{evaluate, NO_SCORE_PRIORITY};
use crate::workers::{expand_batch, expand_value, Expansion};

/// Name under which the best-first searcher is registered.
pub const BEST_FIRST: &str = "best_first";

/// Run best-first search from `ciphertext`.
///
/// Every runtime termination (accept, exhaustion, budget, cancel, timeout)
/// is reported through [`SearchReport::outcome`].
///
/// # Errors
///
/// Returns [`SearchError`] only for pre-flight failures: an invalid
/// policy, an empty cracker or checker list, or a format disagreement.
pub fn search(
    ciphertext: &Value,
    plugins: &PluginSet,
    policy: &SearchPolicy,
    control: &SearchControl,
) -> Result<SearchReport, SearchError> {
    policy.validate()?;
    plugins.validate(ciphertext)?;
    Ok(Engine::new(plugins, policy, control).run(ciphertext))
}

/// [`Searcher`] wrapper around [`search`] with a fixed policy.
#[derive(Debug, Clone, Default)]
pub struct BestFirstSearcher {
    policy: SearchPolicy,
}

impl BestFirstSearcher {
    #[must_use]
    pub fn new(policy: SearchPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }
}

impl Searcher for BestFirstSearcher {
    fn name(&self) -> &str {
        BEST_FIRST
    }

    fn search(
        &self,
        ciphertext: &Value,
        plugins: &PluginSet,
        control: &SearchControl,
    ) -> Result<SearchReport, SearchError> {
        search(ciphertext, plugins, &self.policy, control)
    }
}

/// Per-call search state. Never shared between calls.
struct Engine<'a> {
    plugins: &'a PluginSet,
    policy: &'a SearchPolicy,
    control: &'a SearchControl,
    started: Instant,
    deadline: Option<Instant>,
    arena: NodeArena,
    frontier: BestFirstFrontier,
    visited: VisitedSet,
    /// Expansions computed ahead of their commit.
    speculative: HashMap<NodeId, Expansion>,
    stats: SearchStatsV1,
    next_creation_order: u64,
}

impl<'a> Engine<'a> {
    fn new(plugins: &'a PluginSet, policy: &'a SearchPolicy, control: &'a SearchControl) -> Self {
        let started = Instant::now();
        Self {
            plugins,
            policy,
            control,
            started,
            deadline: policy.timeout.and_then(|t| started.checked_add(t)),
            arena: NodeArena::new(),
            frontier: BestFirstFrontier::new(),
            visited: VisitedSet::new(),
            speculative: HashMap::new(),
            stats: SearchStatsV1::default(),
            next_creation_order: 0,
        }
    }

    fn run(mut self, ciphertext: &Value) -> SearchReport {
        info!(
            format = %self.plugins.format,
            crackers = self.plugins.crackers.len(),
            checkers = self.plugins.checkers.len(),
            max_depth = self.policy.max_depth,
            workers = self.policy.workers,
            "search started"
        );
        let outcome = self.explore(ciphertext);
        self.stats.frontier_high_water = self.frontier.high_water();
        self.stats.elapsed = self.started.elapsed();
        info!(
            outcome = outcome.kind(),
            expansions = self.stats.expansions,
            nodes = self.arena.len(),
            elapsed_ms = u64::try_from(self.stats.elapsed.as_millis()).unwrap_or(u64::MAX),
            "search finished"
        );
        SearchReport {
            outcome,
            stats: self.stats,
        }
    }

    fn explore(&mut self, ciphertext: &Value) -> SearchOutcome {
        let root_eval = self
            .policy
            .accept_root
            .then(|| evaluate(&self.plugins.checkers, ciphertext, self.policy.combine));
        let fingerprint = ciphertext.fingerprint();
        self.visited.check_and_insert(&fingerprint, 0);
        let root = SearchNode {
            node_id: 0,
            parent_id: None,
            value: ciphertext.clone(),
            fingerprint,
            depth: 0,
            priority: root_eval.as_ref().map_or(NO_SCORE_PRIORITY, |e| e.priority),
            creation_order: self.bump_creation_order(),
            origin: None,
        };
        let key = FrontierKey::from(&root);
        let root_id = self.arena.push(root);
        if let Some(checker) = root_eval.and_then(|e| e.accepted_by) {
            debug!(checker = %checker, "ciphertext accepted as-is");
            return SearchOutcome::Found(self.accept(root_id, checker));
        }
        self.frontier.push(root_id, key);

        loop {
            if let Some(reason) = self.interrupted() {
                return SearchOutcome::Cancelled(reason);
            }
            if self.frontier.is_empty() {
                return SearchOutcome::Exhausted(ExhaustionReason::FrontierExhausted);
            }
            let remaining_budget = self.policy.max_expansions.saturating_sub(self.stats.expansions);
            if remaining_budget == 0 {
                return SearchOutcome::Exhausted(ExhaustionReason::ExpansionBudgetExceeded);
            }

            let batch_size = usize::try_from(remaining_budget)
                .unwrap_or(usize::MAX)
                .min(self.policy.workers);
            let mut batch = Vec::with_capacity(batch_size);
            while batch.len() < batch_size {
                match self.frontier.pop() {
                    Some(entry) => batch.push(entry),
                    None => break,
                }
            }
            self.speculate(&batch);
            if let Some(result) = self.commit_batch(batch) {
                return SearchOutcome::Found(result);
            }
        }
    }

    fn interrupted(&self) -> Option<CancelReason> {
        if self.control.cancel.is_cancelled() {
            return Some(CancelReason::Signal);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(CancelReason::Timeout);
        }
        None
    }

    fn bump_creation_order(&mut self) -> u64 {
        let order = self.next_creation_order;
        self.next_creation_order += 1;
        order
    }

    /// Expand every batch node that has no cached expansion yet.
    fn speculate(&mut self, batch: &[(NodeId, FrontierKey)]) {
        let jobs: Vec<(NodeId, &Value)> = batch
            .iter()
            .filter(|(id, _)| !self.speculative.contains_key(id) && !self.superseded(*id))
            .filter_map(|(id, _)| self.arena.get(*id).map(|n| (*id, &n.value)))
            .collect();
        if jobs.is_empty() {
            return;
        }
        let cancel = &self.control.cancel;
        let deadline = self.deadline;
        let stop = move || cancel.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d);
        let done = expand_batch(&jobs, self.plugins, self.policy, &stop);
        self.speculative.extend(done);
    }

    /// Commit `batch` in pop order. Returns the result on accept.
    fn commit_batch(&mut self, batch: Vec<(NodeId, FrontierKey)>) -> Option<SearchResultV1> {
        let max_frontier = usize::try_from(self.policy.max_frontier_size).unwrap_or(usize::MAX);
        let mut pending = batch.into_iter();
        let mut first = true;

        while let Some((id, key)) = pending.next() {
            if !first {
                let outranked = self.frontier.peek_key().is_some_and(|top| top < key);
                let must_stop = self.interrupted().is_some()
                    || self.stats.expansions >= self.policy.max_expansions;
                if outranked || must_stop {
                    self.requeue(std::iter::once((id, key)).chain(pending));
                    return None;
                }
            }
            first = false;

            if self.superseded(id) {
                self.speculative.remove(&id);
                self.stats.superseded_skipped += 1;
                debug!(node = id, "superseded by a shorter path");
                continue;
            }

            let expansion = match self.speculative.remove(&id) {
                Some(e) => e,
                None => {
                    let value = &self.arena.get(id)?.value;
                    expand_value(value, self.plugins, self.policy)
                }
            };
            if let Some(result) = self.commit(id, expansion) {
                return Some(result);
            }

            // The batch remainder is part of the frontier a single worker
            // would see, so it counts toward the prune threshold.
            if self.frontier.len() + pending.len() > max_frontier {
                self.requeue(pending);
                self.prune(max_frontier);
                return None;
            }
        }
        None
    }

    fn superseded(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|n| self.visited.is_superseded(&n.fingerprint, n.depth))
    }

    fn requeue(&mut self, rest: impl Iterator<Item = (NodeId, FrontierKey)>) {
        for (id, key) in rest {
            self.frontier.push(id, key);
            self.stats.speculative_requeues += 1;
        }
    }

    fn prune(&mut self, max_frontier: usize) {
        let pruned = self.frontier.prune_to(max_frontier);
        if pruned.is_empty() {
            return;
        }
        debug!(pruned = pruned.len(), "frontier pruned");
        self.stats.frontier_pruned += pruned.len() as u64;
        for id in pruned {
            self.speculative.remove(&id);
        }
    }

    /// Apply one expansion: dedup children, create nodes, push or accept.
    fn commit(&mut self, id: NodeId, expansion: Expansion) -> Option<SearchResultV1> {
        let (depth, priority) = {
            let parent = self.arena.get(id)?;
            (parent.depth, parent.priority)
        };
        let child_depth = depth + 1;
        self.stats.expansions += 1;
        self.stats.cracker_failures += expansion.failures;
        self.stats.candidates_truncated += expansion.truncated;

        let mut created = 0usize;
        let mut goal = None;
        for child in expansion.children {
            self.stats.candidates_generated += 1;
            let Some(checked) = child.checked else {
                self.stats.format_dropped += 1;
                continue;
            };
            if self.arena.path_contains(id, &checked.fingerprint) {
                self.stats.cycles_suppressed += 1;
                continue;
            }
            if let Visit::Duplicate { .. } =
                self.visited.check_and_insert(&checked.fingerprint, child_depth)
            {
                self.stats.duplicates_suppressed += 1;
                continue;
            }

            let operation = self
                .plugins
                .crackers
                .get(child.cracker)
                .map_or_else(String::new, |c| c.name().to_string());
            let node = SearchNode {
                node_id: 0,
                parent_id: Some(id),
                value: child.output.value,
                fingerprint: checked.fingerprint,
                depth: child_depth,
                priority: checked.evaluation.priority,
                creation_order: self.bump_creation_order(),
                origin: Some(StepOrigin {
                    operation,
                    confidence: child.output.confidence,
                    key_info: child.output.key_info,
                }),
            };
            let key = FrontierKey::from(&node);
            let child_id = self.arena.push(node);
            created += 1;

            if let Some(checker) = checked.evaluation.accepted_by {
                goal = Some((child_id, checker));
                break;
            }
            if child_depth >= self.policy.max_depth {
                self.stats.depth_limited += 1;
                continue;
            }
            self.frontier.push(child_id, key);
        }

        debug!(
            node = id,
            depth,
            priority,
            children = created,
            frontier = self.frontier.len(),
            "expanded"
        );
        if let Some(sink) = &self.control.progress {
            notify(
                sink.as_ref(),
                &ProgressEvent {
                    expansions: self.stats.expansions,
                    frontier_len: self.frontier.len(),
                    depth,
                    priority,
                    elapsed: self.started.elapsed(),
                },
            );
        }

        goal.map(|(goal_id, checker)| {
            debug!(node = goal_id, checker = %checker, "accepted");
            self.accept(goal_id, checker)
        })
    }

    fn accept(&self, id: NodeId, accepted_by: String) -> SearchResultV1 {
        let final_value = self
            .arena
            .get(id)
            .map_or_else(|| Value::Bytes(Vec::new()), |n| n.value.clone());
        SearchResultV1 {
            path: self.arena.materialize_path(id),
            final_value,
            accepted_by,
        }
    }
}
